//! Provides the game state, system sets and the headless gameplay plugin.
//!
//! Everything that decides *when* things happen lives here: the session
//! (state, score, available kinds), the spawner with its cooldown, the shape
//! pool and the death detector. Rendering, input mapping and the rapier
//! pipeline are added by the binary.
//!

use bevy::prelude::*;

pub mod config;
pub mod death;
pub mod game;
pub mod highscore;
pub mod pool;
pub mod shape;
pub mod spawner;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum GameState {
    #[default]
    Menu,
    Playing,
    /// Virtual time is paused, gameplay data is untouched.
    Paused,
    GameOver,
}

/// Ordering of the gameplay systems within one `Update`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameplaySet {
    /// Input mapping turns devices into request events.
    Input,
    /// Death detection, so a breach is applied in the same tick.
    Detect,
    /// Requests become state changes and their side effects.
    Transition,
    /// Drops, rotation and the cooldown.
    Control,
    /// Oscillation and the physics flag sync.
    Motion,
}

/// Run condition on the session state, the counterpart of bevy's `in_state`.
pub fn in_game_state(
    state: GameState,
) -> impl FnMut(Res<game::GameSession>) -> bool + Clone {
    move |session: Res<game::GameSession>| session.state() == state
}

pub fn gameplay_plugin(app: &mut App) {
    app.configure_sets(
        Update,
        (
            GameplaySet::Input,
            GameplaySet::Detect,
            GameplaySet::Transition,
            GameplaySet::Control,
            GameplaySet::Motion,
        )
            .chain(),
    )
    .init_resource::<config::StackerConfig>()
    .register_type::<shape::Shape>()
    .add_plugins((game::plugin, pool::plugin, spawner::plugin, death::plugin));
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::time::TimeUpdateStrategy;

    use super::*;
    use crate::config::StackerConfig;
    use crate::game::{GameOver, GameSession, RequestDrop, RequestTransition};
    use crate::shape::components::*;
    use crate::shape::ShapeKind;
    use crate::spawner::{Spawner, SpawnerPhase};

    const POOL_PER_KIND: usize = 2;

    #[derive(Resource, Default)]
    struct GameOverLog(Vec<u32>);

    fn record_game_overs(
        mut events: EventReader<GameOver>,
        mut log: ResMut<GameOverLog>,
    ) {
        log.0.extend(events.read().map(|e| e.final_score));
    }

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(TimeUpdateStrategy::ManualDuration(
                Duration::from_millis(100),
            ))
            .insert_resource(StackerConfig {
                pools: ShapeKind::ALL
                    .iter()
                    .map(|&k| (k, POOL_PER_KIND))
                    .collect(),
                ..Default::default()
            })
            .insert_resource(GameSession::with_seed(7))
            .init_resource::<GameOverLog>()
            .add_plugins(gameplay_plugin)
            .add_systems(Last, record_game_overs);
        // startup: prewarm pools
        app.update();
        app
    }

    fn count<F: bevy::ecs::query::QueryFilter>(app: &mut App) -> usize {
        let mut query = app.world_mut().query_filtered::<Entity, F>();
        query.iter(app.world()).count()
    }

    fn send<E: Event>(app: &mut App, event: E) {
        app.world_mut().send_event(event);
    }

    fn session(app: &App) -> &GameSession {
        app.world().resource::<GameSession>()
    }

    fn start(app: &mut App) {
        send(app, RequestTransition(GameState::Playing));
        app.update();
    }

    /// Enough ticks for the 0.5 s cooldown to run out.
    fn wait_cooldown(app: &mut App) {
        for _ in 0..8 {
            app.update();
        }
    }

    #[test]
    fn pools_are_prewarmed() {
        let mut app = test_app();
        assert_eq!(
            count::<With<Pooled>>(&mut app),
            ShapeKind::ALL.len() * POOL_PER_KIND
        );
        assert_eq!(session(&app).state(), GameState::Menu);
    }

    #[test]
    fn playing_spawns_exactly_one_active_shape() {
        let mut app = test_app();
        start(&mut app);

        assert_eq!(session(&app).state(), GameState::Playing);
        assert_eq!(session(&app).score(), 0);
        assert_eq!(count::<With<ActiveShape>>(&mut app), 1);

        for _ in 0..5 {
            app.update();
        }
        assert_eq!(count::<With<ActiveShape>>(&mut app), 1);
        assert_eq!(count::<With<DroppedShape>>(&mut app), 0);
    }

    #[test]
    fn two_drops_score_twenty() {
        let mut app = test_app();
        start(&mut app);

        send(&mut app, RequestDrop);
        app.update();
        assert_eq!(session(&app).score(), 10);
        assert_eq!(count::<With<ActiveShape>>(&mut app), 0);

        wait_cooldown(&mut app);
        assert_eq!(count::<With<ActiveShape>>(&mut app), 1);

        send(&mut app, RequestDrop);
        app.update();
        assert_eq!(session(&app).score(), 20);
        assert_eq!(count::<With<DroppedShape>>(&mut app), 2);
    }

    #[test]
    fn double_drop_scores_once() {
        let mut app = test_app();
        start(&mut app);

        send(&mut app, RequestDrop);
        send(&mut app, RequestDrop);
        app.update();

        assert_eq!(session(&app).score(), 10);
        assert_eq!(count::<With<DroppedShape>>(&mut app), 1);
        let spawner = app.world().resource::<Spawner>();
        assert_eq!(spawner.phase(), SpawnerPhase::CoolingDown);
        assert!(!spawner.can_drop());
    }

    #[test]
    fn drop_outside_a_round_is_ignored() {
        let mut app = test_app();
        send(&mut app, RequestDrop);
        app.update();

        assert_eq!(session(&app).score(), 0);
        assert_eq!(count::<With<DroppedShape>>(&mut app), 0);
    }

    #[test]
    fn speed_increases_with_each_spawn() {
        let mut app = test_app();
        start(&mut app);
        let first = app.world().resource::<Spawner>().speed();

        send(&mut app, RequestDrop);
        app.update();
        wait_cooldown(&mut app);

        let second = app.world().resource::<Spawner>().speed();
        assert!(second > first, "{second} <= {first}");
    }

    #[test]
    fn game_over_during_cooldown_suppresses_spawn() {
        let mut app = test_app();
        start(&mut app);

        send(&mut app, RequestDrop);
        app.update();
        send(&mut app, RequestTransition(GameState::GameOver));
        app.update();
        wait_cooldown(&mut app);

        assert_eq!(count::<With<ActiveShape>>(&mut app), 0);
        let spawner = app.world().resource::<Spawner>();
        assert_eq!(spawner.phase(), SpawnerPhase::Idle);
        assert!(spawner.can_drop());
    }

    #[test]
    fn fallen_shape_ends_round_once() {
        let mut app = test_app();
        start(&mut app);
        send(&mut app, RequestDrop);
        app.update();

        let mut dropped = app
            .world_mut()
            .query_filtered::<&mut Transform, With<DroppedShape>>();
        for mut transform in dropped.iter_mut(app.world_mut()) {
            transform.translation.y = -7.0;
        }
        app.update();
        assert_eq!(session(&app).state(), GameState::GameOver);

        // still below the threshold
        app.update();
        app.update();
        assert_eq!(app.world().resource::<GameOverLog>().0, vec![10]);
    }

    #[test]
    fn death_zone_contact_ends_round() {
        use bevy_rapier2d::prelude::CollisionEvent;
        use bevy_rapier2d::rapier::geometry::CollisionEventFlags;

        let mut app = test_app();
        let zone = app.world_mut().spawn(crate::death::DeathZone).id();
        start(&mut app);
        send(&mut app, RequestDrop);
        app.update();

        let mut dropped =
            app.world_mut().query_filtered::<Entity, With<DroppedShape>>();
        let shape = dropped.single(app.world());
        send(
            &mut app,
            CollisionEvent::Started(shape, zone, CollisionEventFlags::SENSOR),
        );
        app.update();

        assert_eq!(session(&app).state(), GameState::GameOver);
        assert_eq!(app.world().resource::<GameOverLog>().0, vec![10]);
    }

    #[test]
    fn simultaneous_breaches_end_round_once() {
        use bevy_rapier2d::prelude::CollisionEvent;
        use bevy_rapier2d::rapier::geometry::CollisionEventFlags;

        let mut app = test_app();
        let zone = app.world_mut().spawn(crate::death::DeathZone).id();
        start(&mut app);
        send(&mut app, RequestDrop);
        app.update();
        wait_cooldown(&mut app);
        send(&mut app, RequestDrop);
        app.update();
        assert_eq!(count::<With<DroppedShape>>(&mut app), 2);

        let mut dropped = app
            .world_mut()
            .query_filtered::<(Entity, &mut Transform), With<DroppedShape>>();
        let mut shapes = Vec::new();
        for (id, mut transform) in dropped.iter_mut(app.world_mut()) {
            transform.translation.y = -7.0;
            shapes.push(id);
        }
        send(
            &mut app,
            CollisionEvent::Started(
                shapes[0],
                zone,
                CollisionEventFlags::SENSOR,
            ),
        );
        app.update();
        app.update();

        assert_eq!(session(&app).state(), GameState::GameOver);
        assert_eq!(app.world().resource::<GameOverLog>().0, vec![20]);
    }

    #[test]
    fn restart_requests_in_one_frame_leave_one_active_shape() {
        let mut app = test_app();
        send(&mut app, RequestTransition(GameState::Playing));
        send(&mut app, RequestTransition(GameState::GameOver));
        send(&mut app, RequestTransition(GameState::Playing));
        app.update();

        assert_eq!(session(&app).state(), GameState::Playing);
        assert_eq!(count::<With<ActiveShape>>(&mut app), 1);
        assert_eq!(
            count::<With<Pooled>>(&mut app),
            ShapeKind::ALL.len() * POOL_PER_KIND - 1
        );
        let pool = app.world().resource::<crate::pool::ShapePool>();
        assert_eq!(pool.outstanding(), 1);
    }

    #[test]
    fn pause_freezes_the_cooldown() {
        let mut app = test_app();
        start(&mut app);
        send(&mut app, RequestDrop);
        app.update();

        send(&mut app, RequestTransition(GameState::Paused));
        app.update();
        for _ in 0..10 {
            app.update();
        }
        assert_eq!(count::<With<ActiveShape>>(&mut app), 0);
        let spawner = app.world().resource::<Spawner>();
        assert_eq!(spawner.phase(), SpawnerPhase::CoolingDown);

        send(&mut app, RequestTransition(GameState::Playing));
        app.update();
        wait_cooldown(&mut app);
        assert_eq!(count::<With<ActiveShape>>(&mut app), 1);
    }

    #[test]
    fn pause_holds_the_active_shape_in_place() {
        let mut app = test_app();
        start(&mut app);
        app.update();

        let mut active = app
            .world_mut()
            .query_filtered::<&Transform, With<ActiveShape>>();
        send(&mut app, RequestTransition(GameState::Paused));
        app.update();
        let x = active.single(app.world()).translation.x;
        for _ in 0..5 {
            app.update();
        }
        assert_eq!(active.single(app.world()).translation.x, x);

        send(&mut app, RequestTransition(GameState::Playing));
        app.update();
        app.update();
        assert_ne!(active.single(app.world()).translation.x, x);
    }

    #[test]
    fn pause_and_resume_keep_the_round() {
        let mut app = test_app();
        start(&mut app);
        send(&mut app, RequestDrop);
        app.update();

        send(&mut app, RequestTransition(GameState::Paused));
        app.update();
        assert!(app.world().resource::<Time<Virtual>>().is_paused());

        send(&mut app, RequestTransition(GameState::Playing));
        app.update();
        assert!(!app.world().resource::<Time<Virtual>>().is_paused());
        assert_eq!(session(&app).score(), 10);
        assert_eq!(count::<With<DroppedShape>>(&mut app), 1);
    }

    #[test]
    fn restart_returns_the_field_to_the_pool() {
        let mut app = test_app();
        start(&mut app);
        send(&mut app, RequestDrop);
        app.update();
        send(&mut app, RequestTransition(GameState::GameOver));
        app.update();

        start(&mut app);
        assert_eq!(session(&app).score(), 0);
        assert_eq!(count::<With<DroppedShape>>(&mut app), 0);
        assert_eq!(count::<With<ActiveShape>>(&mut app), 1);
        assert_eq!(
            count::<With<Pooled>>(&mut app),
            ShapeKind::ALL.len() * POOL_PER_KIND - 1
        );
    }
}
