use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    Collectible,
    Hazard,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 2] = [ObjectKind::Collectible, ObjectKind::Hazard];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Collectible => "star",
            ObjectKind::Hazard => "bomb",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Room-unique object identity. The serial comes from a per-room counter
/// that never rewinds, so an id is never handed out twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId {
    pub kind: ObjectKind,
    pub serial: u64,
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.serial)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    pub id: ObjectId,
    pub position: Vec2,
}

impl WorldObject {
    pub fn kind(&self) -> ObjectKind {
        self.id.kind
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn ids_order_by_kind_then_serial() {
        let mut ids = vec![
            ObjectId { kind: ObjectKind::Hazard, serial: 1 },
            ObjectId { kind: ObjectKind::Collectible, serial: 7 },
            ObjectId { kind: ObjectKind::Collectible, serial: 2 },
        ];
        ids.sort();

        let names: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["star-2", "star-7", "bomb-1"]);

        let by_id: BTreeMap<ObjectId, usize> = ids.iter().copied().zip(0..).collect();
        assert_eq!(by_id.len(), 3);
    }
}
