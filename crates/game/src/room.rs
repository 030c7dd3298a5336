use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::agent::{Agent, SessionKey};
use crate::clock::{ClockReport, SimulationClock};
use crate::config::RoomConfig;
use crate::error::{Result, RoomError};
use crate::events::RoomEvent;
use crate::input::{self, Intent};
use crate::session::{self, JoinOptions};
use crate::state::{RoomState, StatePatch, WorldBounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    Running,
    Failed,
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomStats {
    pub tick: u64,
    pub agent_count: usize,
    pub max_agents: usize,
    pub collectible_count: usize,
    pub hazard_count: usize,
    pub status: RoomStatus,
}

/// Receives replicated changes and broadcast events from a room.
pub trait StateObserver {
    fn on_patch(&mut self, patch: &StatePatch);
    fn on_event(&mut self, event: &RoomEvent);
}

/// One authoritative simulation instance.
///
/// Network handlers (`on_join`, `on_leave`, `on_intent`) only touch the
/// agent set and input queues. Positions, scores and objects change only
/// inside `on_tick`.
pub struct Room {
    config: RoomConfig,
    state: RoomState,
    clock: SimulationClock,
    rng: StdRng,
    events: Vec<RoomEvent>,
    status: RoomStatus,
}

impl Room {
    /// Builds a room. A `seed` makes spawn positions, cosmetics and
    /// placeholder names reproducible.
    pub fn new(config: RoomConfig, seed: Option<u64>) -> Result<Self> {
        config.validate()?;

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = RoomState::new(WorldBounds::new(config.world_width, config.world_height));

        log::info!(
            "Room created: {}x{} at {} Hz",
            config.world_width,
            config.world_height,
            config.tick_rate
        );

        Ok(Self {
            clock: SimulationClock::new(&config),
            state,
            rng,
            events: Vec::new(),
            status: RoomStatus::Running,
            config,
        })
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn state(&self) -> &RoomState {
        &self.state
    }

    /// Direct access for hosts that seed or inspect the world outside the
    /// normal message flow.
    pub fn state_mut(&mut self) -> &mut RoomState {
        &mut self.state
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn tick(&self) -> u64 {
        self.clock.tick()
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn agent(&self, key: &SessionKey) -> Option<&Agent> {
        self.state.agents.get(key)
    }

    pub fn on_join(&mut self, key: impl Into<SessionKey>, options: &JoinOptions) -> Result<&Agent> {
        self.ensure_running()?;
        session::on_join(
            &mut self.state,
            key.into(),
            options,
            &self.config,
            &mut self.rng,
        )
    }

    pub fn on_leave(&mut self, key: &SessionKey) -> bool {
        session::on_leave(&mut self.state, key).is_some()
    }

    pub fn on_intent(&mut self, key: &SessionKey, intent: Intent) -> bool {
        if self.status != RoomStatus::Running {
            return false;
        }
        input::enqueue(&mut self.state, key, intent)
    }

    /// Advances the room by one wall-clock delta. An invariant violation
    /// moves the room to `Failed`; the host is expected to tear it down.
    pub fn on_tick(&mut self, delta: Duration) -> Result<ClockReport> {
        self.ensure_running()?;

        let result = self.clock.fire(
            delta,
            &mut self.state,
            &self.config,
            &mut self.rng,
            &mut self.events,
        );

        if let Err(err) = &result {
            log::error!("Room failed: {}", err);
            self.status = RoomStatus::Failed;
        }
        result
    }

    pub fn take_patch(&mut self) -> StatePatch {
        self.state.take_patch()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = RoomEvent> + '_ {
        self.events.drain(..)
    }

    /// Hands pending changes and events to `observer`.
    pub fn flush<O: StateObserver + ?Sized>(&mut self, observer: &mut O) {
        let patch = self.state.take_patch();
        if !patch.is_empty() {
            observer.on_patch(&patch);
        }
        for event in self.events.drain(..) {
            observer.on_event(&event);
        }
    }

    /// Agents ranked by score, ties broken by name.
    pub fn leaderboard(&self) -> Vec<(String, u32)> {
        let mut board: Vec<(String, u32)> = self
            .state
            .agents
            .values()
            .map(|a| (a.display_name.clone(), a.score))
            .collect();
        board.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        board
    }

    pub fn stats(&self) -> RoomStats {
        RoomStats {
            tick: self.clock.tick(),
            agent_count: self.state.agents.len(),
            max_agents: self.config.max_agents,
            collectible_count: self.state.collectibles.len(),
            hazard_count: self.state.hazards.len(),
            status: self.status,
        }
    }

    pub fn dispose(&mut self) {
        if self.status == RoomStatus::Disposed {
            return;
        }
        log::info!("Room disposing after {} ticks", self.clock.tick());
        self.state.clear();
        self.state.take_patch();
        self.events.clear();
        self.status = RoomStatus::Disposed;
    }

    fn ensure_running(&self) -> Result<()> {
        match self.status {
            RoomStatus::Running => Ok(()),
            RoomStatus::Failed => Err(RoomError::Failed),
            RoomStatus::Disposed => Err(RoomError::Disposed),
        }
    }
}
