use starfall::SessionKey;

#[derive(Debug, Clone)]
pub enum ServerEvent {
    SessionJoined {
        key: SessionKey,
        display_name: String,
        cosmetic: String,
    },
    SessionLeft {
        key: SessionKey,
    },
    JoinRejected {
        key: SessionKey,
        reason: String,
    },
    HazardTriggered {
        key: SessionKey,
        x: f32,
        y: f32,
    },
    RoomFailed {
        message: String,
    },
}

impl ServerEvent {
    pub fn severity(&self) -> Severity {
        match self {
            ServerEvent::SessionJoined { .. }
            | ServerEvent::SessionLeft { .. }
            | ServerEvent::HazardTriggered { .. } => Severity::Info,
            ServerEvent::JoinRejected { .. } => Severity::Warn,
            ServerEvent::RoomFailed { .. } => Severity::Error,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ServerEvent::SessionJoined {
                key,
                display_name,
                cosmetic,
            } => format!("{} joined as {} ({})", key, display_name, cosmetic),
            ServerEvent::SessionLeft { key } => format!("{} left", key),
            ServerEvent::JoinRejected { key, reason } => {
                format!("Join rejected for {}: {}", key, reason)
            }
            ServerEvent::HazardTriggered { key, x, y } => {
                format!("{} hit a hazard at ({:.0}, {:.0})", key, x, y)
            }
            ServerEvent::RoomFailed { message } => format!("Room failed: {}", message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}
