pub mod agent;
pub mod clock;
pub mod collision;
pub mod config;
pub mod error;
pub mod events;
pub mod input;
pub mod integrator;
pub mod object;
pub mod replicated;
pub mod room;
pub mod session;
pub mod spawner;
pub mod state;

pub use agent::{Agent, SessionKey};
pub use clock::{ClockReport, FixedTimestep, SimulationClock};
pub use config::{
    DEFAULT_TICK_RATE, DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH, MAX_TICK_RATE, RoomConfig,
    SpawnerConfig,
};
pub use error::{ConfigError, Result, RoomError};
pub use events::RoomEvent;
pub use input::{InputBuffer, Intent};
pub use object::{ObjectId, ObjectKind, WorldObject};
pub use replicated::{MapDelta, ReplicatedMap};
pub use room::{Room, RoomStats, RoomStatus, StateObserver};
pub use session::JoinOptions;
pub use spawner::Spawner;
pub use state::{AgentView, RoomState, StatePatch, WorldBounds};
