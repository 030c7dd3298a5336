use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::object::ObjectKind;

pub const DEFAULT_TICK_RATE: u32 = 60;
pub const MAX_TICK_RATE: u32 = 1000;
pub const DEFAULT_WORLD_WIDTH: f32 = 800.0;
pub const DEFAULT_WORLD_HEIGHT: f32 = 600.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnerConfig {
    pub interval_ms: u64,
    pub cap: usize,
    /// Distance kept between a spawned object and every world edge.
    pub margin: f32,
    /// Agents strictly closer than this trigger the object.
    pub collision_radius: f32,
}

impl SpawnerConfig {
    pub fn collectible() -> Self {
        Self {
            interval_ms: 3000,
            cap: 5,
            margin: 20.0,
            collision_radius: 30.0,
        }
    }

    pub fn hazard() -> Self {
        Self {
            interval_ms: 5000,
            cap: 3,
            margin: 20.0,
            collision_radius: 35.0,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    pub world_width: f32,
    pub world_height: f32,
    pub tick_rate: u32,
    pub agent_velocity: f32,
    pub max_agents: usize,
    pub max_display_name_len: usize,
    pub default_name_prefix: String,
    pub cosmetic_pool: Vec<String>,
    /// `None` leaves per-agent input queues unbounded.
    pub max_queued_intents: Option<usize>,
    /// Wall-clock deltas above this are truncated before entering the
    /// fixed-step accumulator. `None` disables the clamp.
    pub max_frame_delta_ms: Option<u64>,
    pub collectible: SpawnerConfig,
    pub hazard: SpawnerConfig,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            world_width: DEFAULT_WORLD_WIDTH,
            world_height: DEFAULT_WORLD_HEIGHT,
            tick_rate: DEFAULT_TICK_RATE,
            agent_velocity: 2.0,
            max_agents: 100,
            max_display_name_len: 12,
            default_name_prefix: String::from("Player"),
            cosmetic_pool: (1..=23).map(|n| format!("ship_{n:04}")).collect(),
            max_queued_intents: Some(240),
            max_frame_delta_ms: None,
            collectible: SpawnerConfig::collectible(),
            hazard: SpawnerConfig::hazard(),
        }
    }
}

impl RoomConfig {
    pub fn fixed_step(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.tick_rate.max(1)))
    }

    pub fn max_frame_delta(&self) -> Option<Duration> {
        self.max_frame_delta_ms.map(Duration::from_millis)
    }

    pub fn spawner(&self, kind: ObjectKind) -> &SpawnerConfig {
        match kind {
            ObjectKind::Collectible => &self.collectible,
            ObjectKind::Hazard => &self.hazard,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.world_width.is_finite() && self.world_width > 0.0)
            || !(self.world_height.is_finite() && self.world_height > 0.0)
        {
            return Err(ConfigError::InvalidBounds {
                width: self.world_width,
                height: self.world_height,
            });
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.tick_rate > MAX_TICK_RATE {
            return Err(ConfigError::TickRateTooHigh {
                rate: self.tick_rate,
                max: MAX_TICK_RATE,
            });
        }
        if !(self.agent_velocity.is_finite() && self.agent_velocity >= 0.0) {
            return Err(ConfigError::InvalidVelocity(self.agent_velocity));
        }
        if self.cosmetic_pool.is_empty() {
            return Err(ConfigError::EmptyCosmeticPool);
        }
        if self.max_display_name_len == 0 {
            return Err(ConfigError::ZeroNameLength);
        }
        if self.max_queued_intents == Some(0) {
            return Err(ConfigError::ZeroInputQueue);
        }

        for kind in ObjectKind::ALL {
            let spawner = self.spawner(kind);
            if spawner.interval_ms == 0 {
                return Err(ConfigError::ZeroSpawnInterval(kind));
            }
            let margin = spawner.margin;
            if !(margin.is_finite() && margin >= 0.0)
                || self.world_width <= margin * 2.0
                || self.world_height <= margin * 2.0
            {
                return Err(ConfigError::NoSpawnArea { kind, margin });
            }
            if !(spawner.collision_radius.is_finite() && spawner.collision_radius >= 0.0) {
                return Err(ConfigError::InvalidCollisionRadius {
                    kind,
                    radius: spawner.collision_radius,
                });
            }
        }

        Ok(())
    }
}
