use serde::{Deserialize, Serialize};

use crate::agent::SessionKey;

/// Fire-and-forget notifications broadcast to every observer alongside
/// state replication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RoomEvent {
    #[serde(rename_all = "camelCase")]
    HazardTriggered { agent_id: SessionKey, x: f32, y: f32 },
}

impl RoomEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RoomEvent::HazardTriggered { .. } => "hazardTriggered",
        }
    }
}
