use crate::agent::SessionKey;
use crate::events::RoomEvent;
use crate::object::{ObjectId, ObjectKind};
use crate::state::RoomState;

/// Tests every agent against every live object of `kind`, in join order.
/// A hit object is removed before the next agent is tested, so no object
/// triggers twice. Returns the number of hits.
pub fn resolve(
    state: &mut RoomState,
    kind: ObjectKind,
    radius: f32,
    events: &mut Vec<RoomEvent>,
) -> usize {
    let keys: Vec<SessionKey> = state.agents.keys().cloned().collect();
    let mut hits = 0;

    for key in keys {
        let Some(position) = state.agents.get(&key).map(|a| a.position) else {
            continue;
        };

        let touched: Vec<ObjectId> = state
            .objects(kind)
            .values()
            .filter(|obj| obj.position.distance(position) < radius)
            .map(|obj| obj.id)
            .collect();

        for id in touched {
            let Some(object) = state.objects_mut(kind).delete(&id) else {
                continue;
            };
            let Some(agent) = state.agents.get_mut(&key) else {
                break;
            };

            match kind {
                ObjectKind::Collectible => {
                    agent.score = agent.score.saturating_add(1);
                    log::info!(
                        "{} collected {}, score {}",
                        agent.display_name,
                        id,
                        agent.score
                    );
                }
                ObjectKind::Hazard => {
                    agent.score = 0;
                    log::info!("{} hit {}, score reset", agent.display_name, id);
                    events.push(RoomEvent::HazardTriggered {
                        agent_id: key.clone(),
                        x: object.position.x,
                        y: object.position.y,
                    });
                }
            }
            hits += 1;
        }
    }

    hits
}
