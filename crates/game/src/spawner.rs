use std::time::Duration;

use rand::Rng;

use crate::config::SpawnerConfig;
use crate::object::{ObjectId, ObjectKind};
use crate::state::RoomState;

/// Timer-gated factory for one kind of world object.
#[derive(Debug, Clone)]
pub struct Spawner {
    kind: ObjectKind,
    interval: Duration,
    cap: usize,
    margin: f32,
    elapsed: Duration,
}

impl Spawner {
    pub fn new(kind: ObjectKind, config: &SpawnerConfig) -> Self {
        Self {
            kind,
            interval: config.interval(),
            cap: config.cap,
            margin: config.margin,
            elapsed: Duration::ZERO,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Advances the timer by `delta` and spawns at most one object. Once the
    /// interval has elapsed the timer restarts from zero whether or not the
    /// population cap allowed a spawn.
    pub fn advance<R: Rng>(
        &mut self,
        delta: Duration,
        state: &mut RoomState,
        rng: &mut R,
    ) -> Option<ObjectId> {
        self.elapsed += delta;
        if self.elapsed < self.interval {
            return None;
        }
        self.elapsed = Duration::ZERO;

        if state.objects(self.kind).len() >= self.cap {
            log::trace!("{} population at cap {}, skipping spawn", self.kind, self.cap);
            return None;
        }

        let position = state.bounds().random_point_inset(rng, self.margin);
        let id = state.insert_object(self.kind, position);
        log::debug!("{} spawned at ({:.1}, {:.1})", id, position.x, position.y);
        Some(id)
    }
}
