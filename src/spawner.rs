//! Spawner / oscillator.
//!
//! Owns the active shape until it is dropped: moves it back and forth, turns a
//! drop request into a committed drop, then waits out the cooldown before the
//! next spawn. Each spawn is a little faster than the one before.

use std::time::Duration;

use bevy::prelude::*;

use crate::config::StackerConfig;
use crate::game::{GameSession, RequestDrop, ScoreChanged};
use crate::pool::ShapePool;
use crate::shape::components::*;
use crate::shape::{rotate_active_shape, sync_simulation, Shape};
use crate::{in_game_state, GameState, GameplaySet};

pub fn plugin(app: &mut App) {
    app.init_resource::<Spawner>()
        .add_systems(
            Update,
            (drop_current_shape, rotate_active_shape)
                .chain()
                .run_if(in_game_state(GameState::Playing))
                .in_set(GameplaySet::Control),
        )
        // the cooldown keeps ticking outside `Playing`, a stop has to be able
        // to cancel it
        .add_systems(
            Update,
            tick_cooldown
                .after(drop_current_shape)
                .in_set(GameplaySet::Control),
        )
        .add_systems(
            Update,
            (
                oscillate_active_shape
                    .run_if(in_game_state(GameState::Playing)),
                sync_simulation,
            )
                .in_set(GameplaySet::Motion),
        );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnerPhase {
    Idle,
    Active,
    CoolingDown,
}

#[derive(Resource, Debug)]
pub struct Spawner {
    spawning: bool,
    can_drop: bool,
    speed: f32,
    /// +1.0 or -1.0
    direction: f32,
    active: Option<Entity>,
    cooldown: Option<Timer>,
}

impl Default for Spawner {
    fn default() -> Self {
        Spawner {
            spawning: false,
            can_drop: true,
            speed: crate::config::BASE_SPEED,
            direction: 1.0,
            active: None,
            cooldown: None,
        }
    }
}

impl Spawner {
    pub fn phase(&self) -> SpawnerPhase {
        match (self.spawning, &self.cooldown) {
            (false, _) => SpawnerPhase::Idle,
            (true, Some(_)) => SpawnerPhase::CoolingDown,
            (true, None) => SpawnerPhase::Active,
        }
    }

    pub fn is_spawning(&self) -> bool {
        self.spawning
    }

    pub fn can_drop(&self) -> bool {
        self.can_drop
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    /// The shape currently oscillating, if any.
    pub fn active(&self) -> Option<Entity> {
        self.active
    }

    /// Any previous round's cooldown is discarded so it cannot spawn a second
    /// shape into this one. The caller spawns the first shape.
    pub fn start(&mut self, base_speed: f32) {
        self.spawning = true;
        self.can_drop = true;
        self.speed = base_speed;
        self.direction = 1.0;
        self.active = None;
        self.cooldown = None;
    }

    /// An armed cooldown keeps running but will not spawn.
    pub fn stop(&mut self) {
        self.spawning = false;
    }

    pub fn on_spawned(&mut self, id: Entity, speed_increment: f32) {
        self.active = Some(id);
        self.speed += speed_increment;
    }

    /// Advance `x` by one tick. Past `limit` the position snaps to the
    /// boundary on the side it was heading and the direction flips.
    pub fn oscillate(&mut self, x: f32, dt: f32, limit: f32) -> f32 {
        let x = x + dt * self.speed * self.direction;
        if x.abs() > limit {
            let clamped = limit * self.direction;
            self.direction = -self.direction;
            clamped
        } else {
            x
        }
    }

    /// Take the active shape for dropping and arm the cooldown. `None` when
    /// there is nothing to drop or a drop is still pending.
    pub fn begin_drop(&mut self, cooldown_secs: f32) -> Option<Entity> {
        if !self.spawning || !self.can_drop {
            return None;
        }
        let id = self.active.take()?;
        self.can_drop = false;
        self.cooldown =
            Some(Timer::from_seconds(cooldown_secs, TimerMode::Once));
        Some(id)
    }

    /// Returns `true` when the cooldown expired this tick and the next shape
    /// should be spawned. Expiry always re-enables dropping.
    pub fn tick_cooldown(&mut self, delta: Duration, game_over: bool) -> bool {
        let Some(timer) = self.cooldown.as_mut() else {
            return false;
        };
        if !timer.tick(delta).finished() {
            return false;
        }
        self.cooldown = None;
        self.can_drop = true;
        self.spawning && !game_over
    }
}

/// Draw a kind, pull it from the pool at the spawn point with a random
/// rotation and hand it to the spawner.
pub fn spawn_next_shape(
    commands: &mut Commands,
    pool: &mut ShapePool,
    session: &mut GameSession,
    spawner: &mut Spawner,
    config: &StackerConfig,
) -> Entity {
    let kind = session.select_random_kind();
    let rotation = session.random_rotation();
    let transform =
        Transform::from_translation(config.spawn_point.extend(0.0))
            .with_rotation(Quat::from_rotation_z(rotation.to_radians()));
    let id = pool.acquire(commands, kind, transform);
    spawner.on_spawned(id, config.speed_increment);
    info!("Spawned {kind}: {:?}, speed {:.1}", id, spawner.speed());
    id
}

pub fn oscillate_active_shape(
    time: Res<Time>,
    config: Res<StackerConfig>,
    mut spawner: ResMut<Spawner>,
    mut shapes: Query<(&Shape, &mut Transform), With<ActiveShape>>,
) {
    if !spawner.is_spawning() {
        return;
    }
    let Some((shape, mut transform)) =
        spawner.active().and_then(|id| shapes.get_mut(id).ok())
    else {
        return;
    };
    if shape.is_dropped() {
        return;
    }
    transform.translation.x = spawner.oscillate(
        transform.translation.x,
        time.delta_seconds(),
        config.x_limit,
    );
}

pub fn drop_current_shape(
    mut commands: Commands,
    mut requests: EventReader<RequestDrop>,
    config: Res<StackerConfig>,
    mut session: ResMut<GameSession>,
    mut spawner: ResMut<Spawner>,
    mut shapes: Query<&mut Shape>,
    mut scores: EventWriter<ScoreChanged>,
) {
    for _ in requests.read() {
        let Some(id) = spawner.begin_drop(config.drop_cooldown) else {
            debug!("drop ignored");
            continue;
        };
        let Ok(mut shape) = shapes.get_mut(id) else {
            warn!("active shape {:?} is gone", id);
            continue;
        };
        if !shape.drop() {
            continue;
        }
        commands
            .entity(id)
            .remove::<ActiveShape>()
            .insert(DroppedShape);
        if let Some(score) = session.add_score(config.score_per_drop) {
            scores.send(ScoreChanged(score));
        }
        info!(
            "Dropped {}: {:?}, score {}",
            shape.kind,
            id,
            session.score()
        );
    }
}

pub fn tick_cooldown(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<StackerConfig>,
    mut session: ResMut<GameSession>,
    mut spawner: ResMut<Spawner>,
    mut pool: ResMut<ShapePool>,
) {
    if !spawner.tick_cooldown(time.delta(), session.is_game_over()) {
        return;
    }
    spawn_next_shape(
        &mut commands,
        &mut pool,
        &mut session,
        &mut spawner,
        &config,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: f32 = 2.5;

    fn started() -> Spawner {
        let mut spawner = Spawner::default();
        spawner.start(8.0);
        spawner
    }

    #[test]
    fn clamps_then_inverts_at_the_limit() {
        let mut spawner = started();
        let x = spawner.oscillate(2.4, 0.05, LIMIT);
        assert_eq!(x, 2.5);
        assert_eq!(spawner.direction(), -1.0);
    }

    #[test]
    fn moves_freely_inside_the_limit() {
        let mut spawner = started();
        let x = spawner.oscillate(0.0, 0.1, LIMIT);
        assert!((x - 0.8).abs() < 1e-6);
        assert_eq!(spawner.direction(), 1.0);
    }

    #[test]
    fn never_leaves_bounds_even_for_large_ticks() {
        let mut spawner = started();
        let mut x = 0.0;
        for dt in [0.3, 1.7, 0.01, 5.0, 0.2, 0.9, 12.0, 0.05] {
            x = spawner.oscillate(x, dt, LIMIT);
            assert!(x.abs() <= LIMIT, "x = {x} after dt = {dt}");
        }
    }

    #[test]
    fn bounces_back_from_the_left() {
        let mut spawner = started();
        spawner.direction = -1.0;
        let x = spawner.oscillate(-2.0, 0.1, LIMIT);
        assert_eq!(x, -2.5);
        assert_eq!(spawner.direction(), 1.0);
    }

    #[test]
    fn start_resets_speed_and_direction() {
        let mut spawner = started();
        spawner.on_spawned(Entity::from_raw(1), 0.5);
        spawner.oscillate(2.4, 0.05, LIMIT);
        spawner.start(8.0);
        assert_eq!(spawner.speed(), 8.0);
        assert_eq!(spawner.direction(), 1.0);
        assert_eq!(spawner.phase(), SpawnerPhase::Active);
    }

    #[test]
    fn drop_without_shape_is_ignored() {
        let mut spawner = started();
        assert_eq!(spawner.begin_drop(0.5), None);
        assert!(spawner.can_drop());

        let mut idle = Spawner::default();
        assert_eq!(idle.begin_drop(0.5), None);
    }

    #[test]
    fn second_drop_is_refused_while_cooling_down() {
        let mut spawner = started();
        let id = Entity::from_raw(7);
        spawner.on_spawned(id, 0.5);

        assert_eq!(spawner.begin_drop(0.5), Some(id));
        assert_eq!(spawner.phase(), SpawnerPhase::CoolingDown);
        assert_eq!(spawner.begin_drop(0.5), None);
        assert!(!spawner.can_drop());
    }

    #[test]
    fn cooldown_expiry_requests_spawn_once() {
        let mut spawner = started();
        spawner.on_spawned(Entity::from_raw(1), 0.5);
        spawner.begin_drop(0.5);

        assert!(!spawner.tick_cooldown(Duration::from_millis(300), false));
        assert!(spawner.tick_cooldown(Duration::from_millis(300), false));
        assert!(spawner.can_drop());
        assert_eq!(spawner.phase(), SpawnerPhase::Active);
        assert!(!spawner.tick_cooldown(Duration::from_secs(1), false));
    }

    #[test]
    fn stop_during_cooldown_cancels_spawn() {
        let mut spawner = started();
        spawner.on_spawned(Entity::from_raw(1), 0.5);
        spawner.begin_drop(0.5);
        spawner.stop();

        assert!(!spawner.tick_cooldown(Duration::from_secs(1), false));
        assert!(spawner.can_drop());
        assert_eq!(spawner.phase(), SpawnerPhase::Idle);
    }

    #[test]
    fn game_over_during_cooldown_cancels_spawn() {
        let mut spawner = started();
        spawner.on_spawned(Entity::from_raw(1), 0.5);
        spawner.begin_drop(0.5);

        assert!(!spawner.tick_cooldown(Duration::from_secs(1), true));
        assert!(spawner.can_drop());
    }

    #[test]
    fn each_spawn_is_faster() {
        let mut spawner = started();
        let mut last = spawner.speed();
        for raw in 0..5 {
            spawner.on_spawned(Entity::from_raw(raw), 0.5);
            assert!(spawner.speed() > last);
            last = spawner.speed();
            spawner.begin_drop(0.5);
            spawner.tick_cooldown(Duration::from_secs(1), false);
        }
    }
}
