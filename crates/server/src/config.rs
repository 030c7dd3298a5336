use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use starfall::RoomConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub room: RoomConfig,
    pub seed: Option<u64>,
    pub bots: usize,
    pub bot_input_rate: u32,
    /// Chance per second that a simulated client drops and reconnects.
    pub bot_churn: f64,
    pub inbound_capacity: usize,
    pub duration: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            room: RoomConfig::default(),
            seed: None,
            bots: 8,
            bot_input_rate: 60,
            bot_churn: 0.02,
            inbound_capacity: 4096,
            duration: None,
        }
    }
}

pub fn load_room_config(path: &Path) -> Result<RoomConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read room config {}", path.display()))?;
    let config: RoomConfig = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse room config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}
