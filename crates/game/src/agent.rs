use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::input::InputBuffer;

/// Opaque per-connection identity handed over by the network layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Agent {
    pub id: SessionKey,
    pub position: Vec2,
    pub last_applied_sequence: u32,
    pub display_name: String,
    pub cosmetic: String,
    pub score: u32,
    #[serde(skip)]
    pub(crate) inputs: InputBuffer,
}

impl Agent {
    pub fn new(
        id: SessionKey,
        position: Vec2,
        display_name: String,
        cosmetic: String,
        max_queued_intents: Option<usize>,
    ) -> Self {
        Self {
            id,
            position,
            last_applied_sequence: 0,
            display_name,
            cosmetic,
            score: 0,
            inputs: InputBuffer::new(max_queued_intents),
        }
    }

    pub fn queued_intents(&self) -> usize {
        self.inputs.len()
    }
}
