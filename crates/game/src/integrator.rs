use glam::Vec2;

use crate::agent::{Agent, SessionKey};
use crate::input::{self, Intent};
use crate::state::{RoomState, WorldBounds};

pub fn apply_intent(agent: &mut Agent, intent: &Intent, velocity: f32, bounds: &WorldBounds) {
    let step = Vec2::new(intent.horizontal(), intent.vertical()) * velocity;
    agent.position = bounds.clamp(agent.position + step);
    agent.last_applied_sequence = intent.sequence;
}

/// Drains and applies every buffered intent, agent by agent in join order.
/// Returns the number of intents applied.
pub fn integrate(state: &mut RoomState, velocity: f32) -> usize {
    let bounds = state.bounds();
    let keys: Vec<SessionKey> = state.agents.keys().cloned().collect();
    let mut applied = 0;

    for key in keys {
        let intents = input::drain_all(state, &key);
        if intents.is_empty() {
            continue;
        }
        let Some(agent) = state.agents.get_mut(&key) else {
            continue;
        };
        for intent in &intents {
            apply_intent(agent, intent, velocity, &bounds);
        }
        applied += intents.len();
    }

    applied
}
