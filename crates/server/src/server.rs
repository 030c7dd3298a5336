use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use starfall::{
    Intent, JoinOptions, Room, RoomError, RoomEvent, RoomStats, SessionKey, StateObserver,
    StatePatch,
};
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};

use crate::config::ServerConfig;
use crate::events::{ServerEvent, Severity};

/// Messages the transport layer hands to the room.
#[derive(Debug, Clone)]
pub enum Inbound {
    Join {
        key: SessionKey,
        options: JoinOptions,
    },
    Leave {
        key: SessionKey,
    },
    Intent {
        key: SessionKey,
        intent: Intent,
    },
}

#[derive(Debug, Default)]
struct Broadcaster {
    patches: u64,
    updates: u64,
    removals: u64,
    events: Vec<RoomEvent>,
}

impl StateObserver for Broadcaster {
    fn on_patch(&mut self, patch: &StatePatch) {
        self.patches += 1;
        self.updates += (patch.agents.updated.len()
            + patch.collectibles.updated.len()
            + patch.hazards.updated.len()) as u64;
        self.removals += (patch.agents.removed.len()
            + patch.collectibles.removed.len()
            + patch.hazards.removed.len()) as u64;

        if log::log_enabled!(log::Level::Trace) {
            match serde_json::to_string(patch) {
                Ok(json) => log::trace!("patch {}", json),
                Err(e) => log::warn!("Failed to encode patch: {}", e),
            }
        }
    }

    fn on_event(&mut self, event: &RoomEvent) {
        log::debug!("broadcast {}", event.name());
        self.events.push(event.clone());
    }
}

pub struct GameServer {
    room: Room,
    inbound_rx: mpsc::Receiver<Inbound>,
    inbound_tx: mpsc::Sender<Inbound>,
    broadcaster: Broadcaster,
    running: Arc<AtomicBool>,
    last_tick_time: Instant,
    start_time: Instant,
    inbound_processed: u64,
    intents_dropped: u64,
    pending_events: VecDeque<ServerEvent>,
    config: ServerConfig,
}

impl GameServer {
    pub fn new(config: ServerConfig) -> Result<Self, RoomError> {
        let room = Room::new(config.room.clone(), config.seed)?;
        let (inbound_tx, inbound_rx) = mpsc::channel(config.inbound_capacity);

        Ok(Self {
            room,
            inbound_rx,
            inbound_tx,
            broadcaster: Broadcaster::default(),
            running: Arc::new(AtomicBool::new(true)),
            last_tick_time: Instant::now(),
            start_time: Instant::now(),
            inbound_processed: 0,
            intents_dropped: 0,
            pending_events: VecDeque::new(),
            config,
        })
    }

    pub fn sender(&self) -> mpsc::Sender<Inbound> {
        self.inbound_tx.clone()
    }

    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = ServerEvent> + '_ {
        self.pending_events.drain(..)
    }

    pub async fn run(&mut self) -> Result<(), RoomError> {
        let mut ticker = interval(self.room.config().fixed_step());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let deadline = self.config.duration.map(|d| self.start_time + d);

        let mut result = Ok(());
        while self.running.load(Ordering::SeqCst) {
            ticker.tick().await;
            result = self.tick_once();
            self.log_pending_events();
            if result.is_err() {
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                self.running.store(false, Ordering::SeqCst);
            }
        }

        self.shutdown();
        result
    }

    fn log_pending_events(&mut self) {
        for event in self.pending_events.drain(..) {
            match event.severity() {
                Severity::Info => log::info!("{}", event.describe()),
                Severity::Warn => log::warn!("{}", event.describe()),
                Severity::Error => log::error!("{}", event.describe()),
            }
        }
    }

    /// Applies queued network messages, then advances the room by the wall
    /// time since the previous call.
    pub fn tick_once(&mut self) -> Result<(), RoomError> {
        self.process_inbound();

        let now = Instant::now();
        let delta = now - self.last_tick_time;
        self.last_tick_time = now;

        if let Err(e) = self.room.on_tick(delta) {
            self.pending_events.push_back(ServerEvent::RoomFailed {
                message: e.to_string(),
            });
            self.running.store(false, Ordering::SeqCst);
            return Err(e);
        }

        self.room.flush(&mut self.broadcaster);
        for event in self.broadcaster.events.drain(..) {
            match event {
                RoomEvent::HazardTriggered { agent_id, x, y } => {
                    self.pending_events.push_back(ServerEvent::HazardTriggered {
                        key: agent_id,
                        x,
                        y,
                    });
                }
            }
        }

        Ok(())
    }

    fn process_inbound(&mut self) {
        while let Ok(message) = self.inbound_rx.try_recv() {
            self.inbound_processed += 1;
            self.handle_inbound(message);
        }
    }

    fn handle_inbound(&mut self, message: Inbound) {
        match message {
            Inbound::Join { key, options } => match self.room.on_join(key.clone(), &options) {
                Ok(agent) => {
                    let event = ServerEvent::SessionJoined {
                        key,
                        display_name: agent.display_name.clone(),
                        cosmetic: agent.cosmetic.clone(),
                    };
                    self.pending_events.push_back(event);
                }
                Err(e) => {
                    self.pending_events.push_back(ServerEvent::JoinRejected {
                        key,
                        reason: e.to_string(),
                    });
                }
            },
            Inbound::Leave { key } => {
                if self.room.on_leave(&key) {
                    self.pending_events
                        .push_back(ServerEvent::SessionLeft { key });
                }
            }
            Inbound::Intent { key, intent } => {
                if !self.room.on_intent(&key, intent) {
                    self.intents_dropped += 1;
                }
            }
        }
    }

    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.inbound_rx.close();
        self.room.dispose();
    }

    pub fn leaderboard(&self) -> Vec<(String, u32)> {
        self.room.leaderboard()
    }

    pub fn stats(&self) -> ServerStats {
        ServerStats {
            room: self.room.stats(),
            uptime_secs: self.start_time.elapsed().as_secs(),
            patches_sent: self.broadcaster.patches,
            entries_updated: self.broadcaster.updates,
            entries_removed: self.broadcaster.removals,
            inbound_processed: self.inbound_processed,
            intents_dropped: self.intents_dropped,
        }
    }

    #[cfg(test)]
    fn room_mut(&mut self) -> &mut Room {
        &mut self.room
    }
}

#[derive(Debug, Clone)]
pub struct ServerStats {
    pub room: RoomStats,
    pub uptime_secs: u64,
    pub patches_sent: u64,
    pub entries_updated: u64,
    pub entries_removed: u64,
    pub inbound_processed: u64,
    pub intents_dropped: u64,
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use starfall::{ObjectKind, RoomStatus};

    use super::*;

    fn server() -> GameServer {
        GameServer::new(ServerConfig {
            seed: Some(11),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn inbound_messages_apply_between_steps() {
        let mut server = server();
        let tx = server.sender();
        let key = SessionKey::from("c1");

        tx.try_send(Inbound::Join {
            key: key.clone(),
            options: JoinOptions::named("Lyra"),
        })
        .unwrap();
        tx.try_send(Inbound::Intent {
            key: SessionKey::from("nobody"),
            intent: Intent::idle(1),
        })
        .unwrap();
        server.tick_once().unwrap();

        let events: Vec<ServerEvent> = server.drain_events().collect();
        assert!(matches!(
            &events[0],
            ServerEvent::SessionJoined { display_name, .. } if display_name == "Lyra"
        ));

        let stats = server.stats();
        assert_eq!(stats.room.agent_count, 1);
        assert_eq!(stats.inbound_processed, 2);
        assert_eq!(stats.intents_dropped, 1);
        assert!(stats.patches_sent >= 1);

        tx.try_send(Inbound::Leave { key: key.clone() }).unwrap();
        tx.try_send(Inbound::Leave { key }).unwrap();
        server.tick_once().unwrap();
        let events: Vec<ServerEvent> = server.drain_events().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ServerEvent::SessionLeft { .. }));
        assert_eq!(server.stats().room.agent_count, 0);
    }

    #[test]
    fn duplicate_join_is_reported() {
        let mut server = server();
        let tx = server.sender();
        for _ in 0..2 {
            tx.try_send(Inbound::Join {
                key: "dup".into(),
                options: JoinOptions::default(),
            })
            .unwrap();
        }
        server.tick_once().unwrap();

        let events: Vec<ServerEvent> = server.drain_events().collect();
        assert!(matches!(events[1], ServerEvent::JoinRejected { .. }));
    }

    #[test]
    fn hazard_events_reach_the_server_log() {
        let mut server = server();
        let tx = server.sender();
        tx.try_send(Inbound::Join {
            key: "h".into(),
            options: JoinOptions::default(),
        })
        .unwrap();
        server.tick_once().unwrap();
        server.drain_events().for_each(drop);

        let position = server.room_mut().agent(&"h".into()).unwrap().position;
        server
            .room_mut()
            .state_mut()
            .insert_object(ObjectKind::Hazard, position + Vec2::new(1.0, 0.0));

        std::thread::sleep(Duration::from_millis(20));
        server.tick_once().unwrap();

        let events: Vec<ServerEvent> = server.drain_events().collect();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, ServerEvent::HazardTriggered { .. }))
        );
    }

    #[tokio::test]
    async fn run_shuts_down_when_room_fails() {
        let mut server = server();
        let key = SessionKey::from("broken");
        server
            .room_mut()
            .on_join(key.clone(), &JoinOptions::default())
            .unwrap();
        if let Some(agent) = server.room_mut().state_mut().agents.get_mut(&key) {
            agent.position = Vec2::new(f32::NAN, 0.0);
        }

        let result = server.run().await;

        assert!(matches!(result, Err(RoomError::InvariantViolation { .. })));
        assert_eq!(server.drain_events().count(), 0);
        assert_eq!(server.stats().room.status, RoomStatus::Disposed);
        assert!(!server.running().load(Ordering::SeqCst));
    }

    #[test]
    fn shutdown_disposes_room() {
        let mut server = server();
        server.shutdown();
        assert_eq!(server.stats().room.status, RoomStatus::Disposed);
        assert!(!server.running().load(Ordering::SeqCst));
    }
}
