use thiserror::Error;

use crate::object::ObjectKind;

pub type Result<T> = std::result::Result<T, RoomError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("world bounds must be positive and finite, got {width}x{height}")]
    InvalidBounds { width: f32, height: f32 },
    #[error("tick rate must be non-zero")]
    ZeroTickRate,
    #[error("tick rate {rate} exceeds the maximum of {max} Hz")]
    TickRateTooHigh { rate: u32, max: u32 },
    #[error("agent velocity must be finite and non-negative, got {0}")]
    InvalidVelocity(f32),
    #[error("cosmetic pool is empty")]
    EmptyCosmeticPool,
    #[error("max display name length must be non-zero")]
    ZeroNameLength,
    #[error("input queue bound must be non-zero when set")]
    ZeroInputQueue,
    #[error("{0} spawn interval must be non-zero")]
    ZeroSpawnInterval(ObjectKind),
    #[error("{kind} spawn margin {margin} leaves no spawnable area")]
    NoSpawnArea { kind: ObjectKind, margin: f32 },
    #[error("{kind} collision radius must be finite and non-negative, got {radius}")]
    InvalidCollisionRadius { kind: ObjectKind, radius: f32 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoomError {
    #[error("invalid room configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("room is full ({max} agents)")]
    RoomFull { max: usize },
    #[error("session {0} has already joined")]
    DuplicateSession(String),
    #[error("invariant violated at tick {tick}: {detail}")]
    InvariantViolation { tick: u64, detail: String },
    #[error("room has failed and must be torn down")]
    Failed,
    #[error("room has been disposed")]
    Disposed,
}

impl RoomError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolation { .. } | Self::Failed)
    }
}
