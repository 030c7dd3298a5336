use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use starfall::{Intent, JoinOptions, SessionKey};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::server::Inbound;

const NAMES: [&str; 12] = [
    "Orion", "Vega", "Lyra", "Nova", "Rigel", "Deneb", "Altair", "Sirius", "Pollux", "Mira",
    "Castor", "Electra",
];

#[derive(Debug, Clone, Copy)]
pub struct BotSettings {
    pub input_rate: u32,
    pub churn_per_sec: f64,
}

/// Simulated clients standing in for remote players. Each one joins, streams
/// intents at `input_rate`, and now and then reconnects under a new session.
pub fn spawn_bots(
    count: usize,
    settings: BotSettings,
    seed: Option<u64>,
    sender: mpsc::Sender<Inbound>,
    running: Arc<AtomicBool>,
) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|id| {
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(id as u64 + 1)),
                None => StdRng::from_entropy(),
            };
            let bot = Bot::new(id, settings, rng);
            tokio::spawn(bot.run(sender.clone(), Arc::clone(&running)))
        })
        .collect()
}

struct Bot {
    id: usize,
    generation: u32,
    sequence: u32,
    held: Intent,
    hold_remaining: u32,
    settings: BotSettings,
    rng: StdRng,
}

impl Bot {
    fn new(id: usize, settings: BotSettings, rng: StdRng) -> Self {
        Self {
            id,
            generation: 0,
            sequence: 0,
            held: Intent::default(),
            hold_remaining: 0,
            settings,
            rng,
        }
    }

    fn session_key(&self) -> SessionKey {
        SessionKey::new(format!("bot-{}-{}", self.id, self.generation))
    }

    fn join_message(&mut self) -> Inbound {
        let name = NAMES[self.rng.gen_range(0..NAMES.len())];
        Inbound::Join {
            key: self.session_key(),
            options: JoinOptions::named(name),
        }
    }

    fn next_intent(&mut self) -> Intent {
        if self.hold_remaining == 0 {
            self.held = Intent {
                left: self.rng.gen_bool(0.3),
                right: self.rng.gen_bool(0.3),
                up: self.rng.gen_bool(0.3),
                down: self.rng.gen_bool(0.3),
                sequence: 0,
            };
            self.hold_remaining = self.rng.gen_range(10..90);
        }
        self.hold_remaining -= 1;
        self.sequence = self.sequence.wrapping_add(1);
        Intent {
            sequence: self.sequence,
            ..self.held
        }
    }

    fn should_reconnect(&mut self) -> bool {
        let per_input = self.settings.churn_per_sec / self.settings.input_rate.max(1) as f64;
        self.rng.gen_bool(per_input.clamp(0.0, 1.0))
    }

    async fn run(mut self, sender: mpsc::Sender<Inbound>, running: Arc<AtomicBool>) {
        let period = Duration::from_secs_f64(1.0 / self.settings.input_rate.max(1) as f64);
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        if sender.send(self.join_message()).await.is_err() {
            return;
        }

        while running.load(Ordering::SeqCst) {
            ticker.tick().await;

            let message = if self.should_reconnect() {
                let leave = Inbound::Leave {
                    key: self.session_key(),
                };
                if sender.send(leave).await.is_err() {
                    return;
                }
                self.generation += 1;
                self.sequence = 0;
                self.join_message()
            } else {
                Inbound::Intent {
                    key: self.session_key(),
                    intent: self.next_intent(),
                }
            };

            if sender.send(message).await.is_err() {
                return;
            }
        }

        let _ = sender
            .send(Inbound::Leave {
                key: self.session_key(),
            })
            .await;
    }
}
