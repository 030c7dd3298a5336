use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, SessionKey};
use crate::config::RoomConfig;
use crate::error::{ConfigError, Result, RoomError};
use crate::state::RoomState;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinOptions {
    #[serde(default, alias = "username")]
    pub display_name: Option<String>,
}

impl JoinOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            display_name: Some(name.into()),
        }
    }
}

pub fn on_join<'a, R: Rng>(
    state: &'a mut RoomState,
    key: SessionKey,
    options: &JoinOptions,
    config: &RoomConfig,
    rng: &mut R,
) -> Result<&'a Agent> {
    if state.agents.contains_key(&key) {
        return Err(RoomError::DuplicateSession(key.to_string()));
    }
    if state.agents.len() >= config.max_agents {
        return Err(RoomError::RoomFull {
            max: config.max_agents,
        });
    }

    let cosmetic = config
        .cosmetic_pool
        .choose(rng)
        .cloned()
        .ok_or(ConfigError::EmptyCosmeticPool)?;
    let display_name = display_name(options, config, rng);
    let position = state.bounds().random_point(rng);

    log::info!(
        "{} joined as {} with {} at ({:.1}, {:.1})",
        key,
        display_name,
        cosmetic,
        position.x,
        position.y
    );

    let agent = Agent::new(
        key.clone(),
        position,
        display_name,
        cosmetic,
        config.max_queued_intents,
    );
    Ok(state.agents.set(key, agent))
}

/// Removes the agent for `key`. Leaving twice is harmless.
pub fn on_leave(state: &mut RoomState, key: &SessionKey) -> Option<Agent> {
    let agent = state.agents.delete(key)?;
    log::info!("{} ({}) left with score {}", key, agent.display_name, agent.score);
    Some(agent)
}

fn display_name<R: Rng>(options: &JoinOptions, config: &RoomConfig, rng: &mut R) -> String {
    let requested = options
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    match requested {
        Some(name) => name.chars().take(config.max_display_name_len).collect(),
        None => {
            let generated = format!(
                "{}_{}",
                config.default_name_prefix,
                rng.gen_range(0..1000)
            );
            generated.chars().take(config.max_display_name_len).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::state::WorldBounds;

    fn setup() -> (RoomState, RoomConfig, StdRng) {
        let config = RoomConfig::default();
        let state = RoomState::new(WorldBounds::new(config.world_width, config.world_height));
        (state, config, StdRng::seed_from_u64(42))
    }

    #[test]
    fn join_creates_agent_inside_bounds() {
        let (mut state, config, mut rng) = setup();
        let agent = on_join(
            &mut state,
            "abc".into(),
            &JoinOptions::named("  Nova  "),
            &config,
            &mut rng,
        )
        .unwrap();
        let position = agent.position;

        assert_eq!(agent.display_name, "Nova");
        assert_eq!(agent.score, 0);
        assert!(config.cosmetic_pool.contains(&agent.cosmetic));
        assert!(state.bounds().contains(position));
        assert_eq!(state.agents.len(), 1);
    }

    #[test]
    fn blank_names_get_placeholder() {
        let (mut state, config, mut rng) = setup();
        let agent = on_join(
            &mut state,
            "a".into(),
            &JoinOptions::named("   "),
            &config,
            &mut rng,
        )
        .unwrap();
        assert!(agent.display_name.starts_with("Player_"));

        let agent = on_join(
            &mut state,
            "b".into(),
            &JoinOptions::default(),
            &config,
            &mut rng,
        )
        .unwrap();
        assert!(agent.display_name.starts_with("Player_"));
    }

    #[test]
    fn long_names_are_truncated() {
        let (mut state, config, mut rng) = setup();
        let agent = on_join(
            &mut state,
            "a".into(),
            &JoinOptions::named("Ñandú-supersonic-pilot"),
            &config,
            &mut rng,
        )
        .unwrap();
        assert_eq!(agent.display_name.chars().count(), 12);
        assert_eq!(agent.display_name, "Ñandú-supers");
    }

    #[test]
    fn duplicate_and_full_rooms_are_rejected() {
        let (mut state, mut config, mut rng) = setup();
        config.max_agents = 1;

        on_join(&mut state, "a".into(), &JoinOptions::default(), &config, &mut rng).unwrap();
        assert!(matches!(
            on_join(&mut state, "a".into(), &JoinOptions::default(), &config, &mut rng),
            Err(RoomError::DuplicateSession(_))
        ));
        assert!(matches!(
            on_join(&mut state, "b".into(), &JoinOptions::default(), &config, &mut rng),
            Err(RoomError::RoomFull { max: 1 })
        ));
        assert_eq!(state.agents.len(), 1);
    }

    #[test]
    fn leave_is_idempotent() {
        let (mut state, config, mut rng) = setup();
        let key = SessionKey::from("gone");
        on_join(&mut state, key.clone(), &JoinOptions::default(), &config, &mut rng).unwrap();

        assert!(on_leave(&mut state, &key).is_some());
        assert!(on_leave(&mut state, &key).is_none());
        assert!(state.agents.is_empty());
    }

    #[test]
    fn username_alias_is_accepted() {
        let options: JoinOptions = serde_json::from_str(r#"{ "username": "Vega" }"#).unwrap();
        assert_eq!(options.display_name.as_deref(), Some("Vega"));
    }
}
