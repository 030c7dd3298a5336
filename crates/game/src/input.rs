use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::agent::SessionKey;
use crate::state::RoomState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub up: bool,
    #[serde(default)]
    pub down: bool,
    pub sequence: u32,
}

impl Intent {
    pub fn idle(sequence: u32) -> Self {
        Self {
            sequence,
            ..Default::default()
        }
    }

    /// -1 for left, +1 for right, 0 otherwise. Left wins when both are held.
    pub fn horizontal(&self) -> f32 {
        if self.left {
            -1.0
        } else if self.right {
            1.0
        } else {
            0.0
        }
    }

    /// -1 for up, +1 for down, 0 otherwise. Up wins when both are held.
    pub fn vertical(&self) -> f32 {
        if self.up {
            -1.0
        } else if self.down {
            1.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    queue: VecDeque<Intent>,
    max_len: Option<usize>,
    evicted: u64,
}

impl InputBuffer {
    pub fn new(max_len: Option<usize>) -> Self {
        Self {
            queue: VecDeque::new(),
            max_len,
            evicted: 0,
        }
    }

    /// Appends `intent`. Returns the oldest queued intent when the bound
    /// forced it out.
    pub fn push(&mut self, intent: Intent) -> Option<Intent> {
        let evicted = match self.max_len {
            Some(max) if self.queue.len() >= max => {
                self.evicted += 1;
                self.queue.pop_front()
            }
            _ => None,
        };
        self.queue.push_back(intent);
        evicted
    }

    pub fn drain(&mut self) -> Vec<Intent> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}

/// Queues `intent` for the agent owned by `key`. Intents for sessions that
/// already left are dropped and reported as `false`.
pub fn enqueue(state: &mut RoomState, key: &SessionKey, intent: Intent) -> bool {
    let Some(agent) = state.agents.get_mut_untracked(key) else {
        log::trace!("Dropping intent {} for departed session {}", intent.sequence, key);
        return false;
    };

    if let Some(dropped) = agent.inputs.push(intent) {
        log::warn!(
            "Input queue for {} is full, evicted intent {}",
            key,
            dropped.sequence
        );
    }
    true
}

pub fn drain_all(state: &mut RoomState, key: &SessionKey) -> Vec<Intent> {
    state
        .agents
        .get_mut_untracked(key)
        .map(|agent| agent.inputs.drain())
        .unwrap_or_default()
}
