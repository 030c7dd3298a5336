use std::time::Duration;

use rand::Rng;

use crate::collision;
use crate::config::RoomConfig;
use crate::error::{Result, RoomError};
use crate::events::RoomEvent;
use crate::integrator;
use crate::object::ObjectKind;
use crate::spawner::Spawner;
use crate::state::RoomState;

pub struct FixedTimestep {
    step: Duration,
    accumulator: Duration,
    max_frame: Option<Duration>,
}

impl FixedTimestep {
    pub fn new(step: Duration, max_frame: Option<Duration>) -> Self {
        Self {
            step,
            accumulator: Duration::ZERO,
            max_frame,
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn accumulate(&mut self, delta: Duration) {
        let delta = match self.max_frame {
            Some(max) => delta.min(max),
            None => delta,
        };
        self.accumulator += delta;
    }

    pub fn consume_step(&mut self) -> bool {
        if self.accumulator >= self.step {
            self.accumulator -= self.step;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockReport {
    pub steps: u32,
    pub intents_applied: usize,
    pub collected: usize,
    pub hazards_hit: usize,
    pub spawned: usize,
}

/// Drives one room: fixed steps of integration and collision first, then
/// one check of each spawner timer per fire.
pub struct SimulationClock {
    timestep: FixedTimestep,
    collectibles: Spawner,
    hazards: Spawner,
    tick: u64,
}

impl SimulationClock {
    pub fn new(config: &RoomConfig) -> Self {
        Self {
            timestep: FixedTimestep::new(config.fixed_step(), config.max_frame_delta()),
            collectibles: Spawner::new(ObjectKind::Collectible, &config.collectible),
            hazards: Spawner::new(ObjectKind::Hazard, &config.hazard),
            tick: 0,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn timestep(&self) -> &FixedTimestep {
        &self.timestep
    }

    pub fn spawner(&self, kind: ObjectKind) -> &Spawner {
        match kind {
            ObjectKind::Collectible => &self.collectibles,
            ObjectKind::Hazard => &self.hazards,
        }
    }

    pub fn fire<R: Rng>(
        &mut self,
        delta: Duration,
        state: &mut RoomState,
        config: &RoomConfig,
        rng: &mut R,
        events: &mut Vec<RoomEvent>,
    ) -> Result<ClockReport> {
        let mut report = ClockReport::default();

        self.timestep.accumulate(delta);
        while self.timestep.consume_step() {
            self.step(state, config, events, &mut report);
            self.verify(state, config)?;
        }

        for spawner in [&mut self.collectibles, &mut self.hazards] {
            if spawner.advance(delta, state, rng).is_some() {
                report.spawned += 1;
            }
        }
        self.verify(state, config)?;

        Ok(report)
    }

    fn step(
        &mut self,
        state: &mut RoomState,
        config: &RoomConfig,
        events: &mut Vec<RoomEvent>,
        report: &mut ClockReport,
    ) {
        report.intents_applied += integrator::integrate(state, config.agent_velocity);
        report.collected += collision::resolve(
            state,
            ObjectKind::Collectible,
            config.collectible.collision_radius,
            events,
        );
        report.hazards_hit += collision::resolve(
            state,
            ObjectKind::Hazard,
            config.hazard.collision_radius,
            events,
        );
        report.steps += 1;
        self.tick += 1;
    }

    fn verify(&self, state: &RoomState, config: &RoomConfig) -> Result<()> {
        match state.check_invariants(config.collectible.cap, config.hazard.cap) {
            Some(detail) => Err(RoomError::InvariantViolation {
                tick: self.tick,
                detail,
            }),
            None => Ok(()),
        }
    }
}
