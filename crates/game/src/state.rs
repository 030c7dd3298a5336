use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, SessionKey};
use crate::object::{ObjectId, ObjectKind, WorldObject};
use crate::replicated::{MapDelta, ReplicatedMap};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f32,
    pub height: f32,
}

impl WorldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn clamp(&self, point: Vec2) -> Vec2 {
        point.clamp(Vec2::ZERO, Vec2::new(self.width, self.height))
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.is_finite()
            && (0.0..=self.width).contains(&point.x)
            && (0.0..=self.height).contains(&point.y)
    }

    pub fn random_point<R: Rng>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            rng.gen_range(0.0..=self.width),
            rng.gen_range(0.0..=self.height),
        )
    }

    /// Uniform point at least `margin` away from every edge. The caller
    /// guarantees `2 * margin` is below both dimensions.
    pub fn random_point_inset<R: Rng>(&self, rng: &mut R, margin: f32) -> Vec2 {
        Vec2::new(
            rng.gen_range(margin..self.width - margin),
            rng.gen_range(margin..self.height - margin),
        )
    }
}

/// Replicated view of one room: bounds, agents and the two object sets.
#[derive(Debug)]
pub struct RoomState {
    bounds: WorldBounds,
    pub agents: ReplicatedMap<SessionKey, Agent>,
    pub collectibles: ReplicatedMap<ObjectId, WorldObject>,
    pub hazards: ReplicatedMap<ObjectId, WorldObject>,
    next_object_serial: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentView {
    pub x: f32,
    pub y: f32,
    pub tick: u32,
    pub display_name: String,
    pub cosmetic: String,
    pub score: u32,
}

impl From<&Agent> for AgentView {
    fn from(agent: &Agent) -> Self {
        Self {
            x: agent.position.x,
            y: agent.position.y,
            tick: agent.last_applied_sequence,
            display_name: agent.display_name.clone(),
            cosmetic: agent.cosmetic.clone(),
            score: agent.score,
        }
    }
}

/// Everything that changed in a room since the previous patch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatePatch {
    pub agents: MapDelta<SessionKey, AgentView>,
    pub collectibles: MapDelta<ObjectId, WorldObject>,
    pub hazards: MapDelta<ObjectId, WorldObject>,
}

impl StatePatch {
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.collectibles.is_empty() && self.hazards.is_empty()
    }
}

impl RoomState {
    pub fn new(bounds: WorldBounds) -> Self {
        Self {
            bounds,
            agents: ReplicatedMap::new(),
            collectibles: ReplicatedMap::new(),
            hazards: ReplicatedMap::new(),
            next_object_serial: 1,
        }
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    pub fn objects(&self, kind: ObjectKind) -> &ReplicatedMap<ObjectId, WorldObject> {
        match kind {
            ObjectKind::Collectible => &self.collectibles,
            ObjectKind::Hazard => &self.hazards,
        }
    }

    pub fn objects_mut(&mut self, kind: ObjectKind) -> &mut ReplicatedMap<ObjectId, WorldObject> {
        match kind {
            ObjectKind::Collectible => &mut self.collectibles,
            ObjectKind::Hazard => &mut self.hazards,
        }
    }

    /// Places a new object without any cap check and returns its fresh id.
    pub fn insert_object(&mut self, kind: ObjectKind, position: Vec2) -> ObjectId {
        let id = ObjectId {
            kind,
            serial: self.next_object_serial,
        };
        self.next_object_serial += 1;
        self.objects_mut(kind)
            .set(id, WorldObject { id, position });
        id
    }

    pub fn take_patch(&mut self) -> StatePatch {
        let agents = self.agents.take_delta();
        StatePatch {
            agents: MapDelta {
                updated: agents
                    .updated
                    .iter()
                    .map(|(key, agent)| (key.clone(), AgentView::from(agent)))
                    .collect(),
                removed: agents.removed,
            },
            collectibles: self.collectibles.take_delta(),
            hazards: self.hazards.take_delta(),
        }
    }

    pub fn clear(&mut self) {
        self.agents.clear();
        self.collectibles.clear();
        self.hazards.clear();
    }

    /// Returns a description of the first broken invariant, if any.
    pub fn check_invariants(&self, max_collectibles: usize, max_hazards: usize) -> Option<String> {
        if let Some(agent) = self.agents.values().find(|a| !self.bounds.contains(a.position)) {
            return Some(format!(
                "agent {} at ({}, {}) is outside {}x{}",
                agent.id, agent.position.x, agent.position.y, self.bounds.width, self.bounds.height
            ));
        }
        if self.collectibles.len() > max_collectibles {
            return Some(format!(
                "{} collectibles exceed cap {}",
                self.collectibles.len(),
                max_collectibles
            ));
        }
        if self.hazards.len() > max_hazards {
            return Some(format!(
                "{} hazards exceed cap {}",
                self.hazards.len(),
                max_hazards
            ));
        }
        None
    }
}
