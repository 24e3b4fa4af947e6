//! Death detection.
//!
//! Two ways to lose: a dropped shape sinks below the fall threshold (polled
//! every tick), or it touches the `DeathZone` sensor (rapier collision
//! event). Both only request `GameOver`; the session ignores repeats.

use bevy::prelude::*;
use bevy_rapier2d::prelude::CollisionEvent;

use crate::config::StackerConfig;
use crate::game::{GameSession, RequestTransition};
use crate::shape::components::DroppedShape;
use crate::{in_game_state, GameState, GameplaySet};

pub fn plugin(app: &mut App) {
    app.add_event::<CollisionEvent>().add_systems(
        Update,
        (
            detect_fallen_shapes.run_if(in_game_state(GameState::Playing)),
            detect_death_zone_contacts,
        )
            .chain()
            .in_set(GameplaySet::Detect),
    );
}

/// Sensor region below the arena.
#[derive(Component, Debug)]
pub struct DeathZone;

/// First shape strictly below `threshold`.
pub fn first_fallen(
    shapes: impl IntoIterator<Item = (Entity, f32)>,
    threshold: f32,
) -> Option<Entity> {
    shapes
        .into_iter()
        .find_map(|(id, y)| (y < threshold).then_some(id))
}

pub fn detect_fallen_shapes(
    config: Res<StackerConfig>,
    shapes: Query<(Entity, &Transform), With<DroppedShape>>,
    mut requests: EventWriter<RequestTransition>,
) {
    let positions = shapes.iter().map(|(id, t)| (id, t.translation.y));
    if let Some(id) = first_fallen(positions, config.fall_threshold) {
        info!("{:?} fell below {}", id, config.fall_threshold);
        requests.send(RequestTransition(GameState::GameOver));
    }
}

pub fn detect_death_zone_contacts(
    session: Res<GameSession>,
    mut collisions: EventReader<CollisionEvent>,
    zones: Query<(), With<DeathZone>>,
    dropped: Query<(), With<DroppedShape>>,
    mut requests: EventWriter<RequestTransition>,
) {
    // drain every event, contacts outside a round are stale
    let mut hit = false;
    for event in collisions.read() {
        if let CollisionEvent::Started(a, b, _) = event {
            hit |= (zones.contains(*a) && dropped.contains(*b))
                || (zones.contains(*b) && dropped.contains(*a));
        }
    }
    if hit && session.state() == GameState::Playing {
        info!("shape entered the death zone");
        requests.send(RequestTransition(GameState::GameOver));
    }
}
