use std::time::Duration;

use glam::Vec2;

use starfall::{
    Intent, JoinOptions, ObjectKind, Room, RoomConfig, RoomEvent, SessionKey, StateObserver,
    StatePatch, collision,
};

fn room() -> Room {
    let _ = env_logger::builder().is_test(true).try_init();
    Room::new(RoomConfig::default(), Some(0x5eed)).unwrap()
}

fn join_at(room: &mut Room, key: &str, x: f32, y: f32) -> SessionKey {
    let key = SessionKey::from(key);
    room.on_join(key.clone(), &JoinOptions::named(key.as_str()))
        .unwrap();
    if let Some(agent) = room.state_mut().agents.get_mut(&key) {
        agent.position = Vec2::new(x, y);
    }
    key
}

fn one_step(room: &mut Room) {
    let step = room.config().fixed_step();
    let report = room.on_tick(step).unwrap();
    assert_eq!(report.steps, 1);
}

#[test]
fn single_right_intent_moves_by_velocity() {
    let mut room = room();
    let key = join_at(&mut room, "a", 100.0, 100.0);

    assert!(room.on_intent(
        &key,
        Intent {
            right: true,
            ..Intent::idle(1)
        }
    ));
    one_step(&mut room);

    let agent = room.agent(&key).unwrap();
    assert_eq!(agent.position, Vec2::new(102.0, 100.0));
    assert_eq!(agent.last_applied_sequence, 1);
}

#[test]
fn left_only_intent_decrements_x_once() {
    let mut room = room();
    let key = join_at(&mut room, "a", 300.0, 200.0);

    room.on_intent(
        &key,
        Intent {
            left: true,
            ..Intent::idle(7)
        },
    );
    one_step(&mut room);
    one_step(&mut room);

    let agent = room.agent(&key).unwrap();
    assert_eq!(agent.position, Vec2::new(298.0, 200.0));
}

#[test]
fn opposing_directions_favour_left_and_up() {
    let mut room = room();
    let key = join_at(&mut room, "a", 300.0, 200.0);

    room.on_intent(
        &key,
        Intent {
            left: true,
            right: true,
            up: true,
            down: true,
            sequence: 1,
        },
    );
    one_step(&mut room);

    assert_eq!(room.agent(&key).unwrap().position, Vec2::new(298.0, 198.0));
}

#[test]
fn intents_wait_for_the_next_step() {
    let mut room = room();
    let key = join_at(&mut room, "a", 300.0, 200.0);

    room.on_intent(
        &key,
        Intent {
            down: true,
            ..Intent::idle(1)
        },
    );
    room.on_tick(Duration::from_millis(1)).unwrap();
    assert_eq!(room.agent(&key).unwrap().position.y, 200.0);
    assert_eq!(room.agent(&key).unwrap().queued_intents(), 1);

    room.on_tick(room.config().fixed_step()).unwrap();
    assert_eq!(room.agent(&key).unwrap().position.y, 202.0);
}

#[test]
fn long_stall_is_fully_caught_up() {
    let mut room = room();

    let report = room.on_tick(Duration::from_secs(1)).unwrap();
    assert_eq!(report.steps, 60);
    assert_eq!(room.tick(), 60);

    let report = room.on_tick(Duration::ZERO).unwrap();
    assert_eq!(report.steps, 0);
}

#[test]
fn full_input_queue_drops_oldest_intent() {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = RoomConfig {
        max_queued_intents: Some(2),
        ..Default::default()
    };
    let mut room = Room::new(config, Some(0x5eed)).unwrap();
    let key = join_at(&mut room, "a", 300.0, 200.0);

    for intent in [
        Intent {
            left: true,
            ..Intent::idle(1)
        },
        Intent {
            right: true,
            ..Intent::idle(2)
        },
        Intent {
            down: true,
            ..Intent::idle(3)
        },
    ] {
        assert!(room.on_intent(&key, intent));
    }
    assert_eq!(room.agent(&key).unwrap().queued_intents(), 2);

    one_step(&mut room);

    let agent = room.agent(&key).unwrap();
    assert_eq!(agent.position, Vec2::new(302.0, 202.0));
    assert_eq!(agent.last_applied_sequence, 3);
    assert_eq!(agent.queued_intents(), 0);
}

#[test]
fn collectible_is_collected_exactly_once() {
    let mut room = room();
    let key = join_at(&mut room, "a", 50.0, 50.0);
    room.state_mut()
        .insert_object(ObjectKind::Collectible, Vec2::new(50.0, 50.0));

    let mut events = Vec::new();
    let hits = collision::resolve(room.state_mut(), ObjectKind::Collectible, 30.0, &mut events);
    assert_eq!(hits, 1);
    assert!(room.state().collectibles.is_empty());
    assert_eq!(room.agent(&key).unwrap().score, 1);

    collision::resolve(room.state_mut(), ObjectKind::Collectible, 30.0, &mut events);
    one_step(&mut room);
    assert_eq!(room.agent(&key).unwrap().score, 1);
    assert!(events.is_empty());
}

#[test]
fn hazard_resets_score_and_emits_one_event() {
    let mut room = room();
    let key = join_at(&mut room, "a", 10.0, 10.0);
    if let Some(agent) = room.state_mut().agents.get_mut(&key) {
        agent.score = 4;
    }
    room.state_mut()
        .insert_object(ObjectKind::Hazard, Vec2::new(10.0, 10.0));

    one_step(&mut room);

    assert_eq!(room.agent(&key).unwrap().score, 0);
    assert!(room.state().hazards.is_empty());
    let events: Vec<RoomEvent> = room.drain_events().collect();
    assert_eq!(
        events,
        vec![RoomEvent::HazardTriggered {
            agent_id: key,
            x: 10.0,
            y: 10.0,
        }]
    );
}

#[test]
fn collectible_spawns_when_interval_completes() {
    let mut room = room();

    room.on_tick(Duration::from_millis(2999)).unwrap();
    assert!(room.state().collectibles.is_empty());

    room.on_tick(Duration::from_millis(1)).unwrap();
    assert_eq!(room.state().collectibles.len(), 1);
    assert_eq!(
        room.clock().spawner(ObjectKind::Collectible).elapsed(),
        Duration::ZERO
    );
    assert!(room.state().hazards.is_empty());
}

#[test]
fn earlier_joiner_takes_contested_collectible() {
    let mut room = room();
    let a = join_at(&mut room, "a", 200.0, 200.0);
    let b = join_at(&mut room, "b", 205.0, 200.0);
    room.state_mut()
        .insert_object(ObjectKind::Collectible, Vec2::new(202.0, 200.0));

    one_step(&mut room);

    assert_eq!(room.agent(&a).unwrap().score, 1);
    assert_eq!(room.agent(&b).unwrap().score, 0);
    assert!(room.state().collectibles.is_empty());
}

#[test]
fn leave_twice_is_a_noop() {
    let mut room = room();
    let key = join_at(&mut room, "a", 1.0, 1.0);
    join_at(&mut room, "b", 1.0, 1.0);

    assert!(room.on_leave(&key));
    assert!(!room.on_leave(&key));
    assert_eq!(room.stats().agent_count, 1);
    assert!(!room.on_intent(&key, Intent::idle(3)));
}

#[test]
fn population_never_exceeds_caps() {
    let mut room = room();
    for _ in 0..200 {
        room.on_tick(Duration::from_millis(1000)).unwrap();
        let stats = room.stats();
        assert!(stats.collectible_count <= 5);
        assert!(stats.hazard_count <= 3);
    }
    assert_eq!(room.stats().collectible_count, 5);
    assert_eq!(room.stats().hazard_count, 3);
}

#[test]
fn seeded_rooms_are_reproducible() {
    let run = || {
        let mut room = Room::new(RoomConfig::default(), Some(77)).unwrap();
        room.on_join("a", &JoinOptions::default()).unwrap();
        for _ in 0..10 {
            room.on_tick(Duration::from_millis(1000)).unwrap();
        }
        let agent = room.agent(&"a".into()).unwrap();
        let mut objects: Vec<Vec2> = room
            .state()
            .collectibles
            .values()
            .map(|o| o.position)
            .collect();
        objects.extend(room.state().hazards.values().map(|o| o.position));
        (agent.position, agent.display_name.clone(), agent.cosmetic.clone(), objects)
    };
    assert_eq!(run(), run());
}

#[derive(Default)]
struct Replica {
    agents: Vec<(SessionKey, f32, f32, u32)>,
    collectibles: usize,
    events: usize,
}

impl StateObserver for Replica {
    fn on_patch(&mut self, patch: &StatePatch) {
        self.agents.retain(|(k, ..)| !patch.agents.removed.contains(k));
        for (key, view) in &patch.agents.updated {
            self.agents.retain(|(k, ..)| k != key);
            self.agents.push((key.clone(), view.x, view.y, view.score));
        }
        self.collectibles += patch.collectibles.updated.len();
        self.collectibles -= patch.collectibles.removed.len();
    }

    fn on_event(&mut self, _event: &RoomEvent) {
        self.events += 1;
    }
}

#[test]
fn observer_replica_tracks_room() {
    let mut room = room();
    let mut replica = Replica::default();
    let key = join_at(&mut room, "a", 400.0, 300.0);
    room.flush(&mut replica);
    assert_eq!(replica.agents, vec![(key.clone(), 400.0, 300.0, 0)]);

    room.state_mut()
        .insert_object(ObjectKind::Collectible, Vec2::new(404.0, 300.0));
    room.flush(&mut replica);
    assert_eq!(replica.collectibles, 1);

    room.on_intent(
        &key,
        Intent {
            right: true,
            ..Intent::idle(1)
        },
    );
    one_step(&mut room);
    room.flush(&mut replica);
    assert_eq!(replica.agents, vec![(key.clone(), 402.0, 300.0, 1)]);
    assert_eq!(replica.collectibles, 0);

    room.on_leave(&key);
    room.flush(&mut replica);
    assert!(replica.agents.is_empty());
    assert_eq!(replica.events, 0);
}
