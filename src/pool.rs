//! Reserve of prebuilt shape entities per kind.
//!
//! Entities never get despawned: `acquire` pops one from the kind's reserve
//! (or builds an overflow one when the reserve is dry) and `release` hides it
//! and pushes it back. Handed out instances are tracked until released, so a
//! new round can reclaim them before their markers are even applied.

use std::collections::VecDeque;

use bevy::prelude::*;
use bevy::utils::HashMap;

use crate::config::StackerConfig;
use crate::game::{GameSession, KindChange};
use crate::shape::components::*;
use crate::shape::{initialize, ShapeBodyBundle, ShapeKind};

pub fn plugin(app: &mut App) {
    app.init_resource::<ShapePool>()
        .add_systems(Startup, (prewarm_pools, validate_pools).chain());
}

#[derive(Resource, Debug, Default)]
pub struct ShapePool {
    reserves: HashMap<ShapeKind, VecDeque<Entity>>,
    overflow: HashMap<ShapeKind, u32>,
    /// Instances handed out by `acquire` and not yet released.
    outstanding: HashMap<Entity, ShapeKind>,
    gravity_scale: f32,
}

impl ShapePool {
    pub fn has_pool(&self, kind: ShapeKind) -> bool {
        self.reserves.contains_key(&kind)
    }

    /// Entities waiting in the kind's reserve.
    pub fn reserved(&self, kind: ShapeKind) -> usize {
        self.reserves.get(&kind).map_or(0, VecDeque::len)
    }

    /// How many instances had to be built because the reserve was empty.
    pub fn overflow_count(&self, kind: ShapeKind) -> u32 {
        self.overflow.get(&kind).copied().unwrap_or(0)
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Build `size` hidden instances of `kind`.
    pub fn prewarm(
        &mut self,
        commands: &mut Commands,
        kind: ShapeKind,
        size: usize,
        gravity_scale: f32,
    ) {
        self.gravity_scale = gravity_scale;
        let reserve = self.reserves.entry(kind).or_default();
        for _ in 0..size {
            let id = spawn_instance(
                commands,
                kind,
                Transform::default(),
                gravity_scale,
            );
            commands.entity(id).insert((Pooled, Visibility::Hidden));
            reserve.push_back(id);
        }
    }

    /// Hand out an active instance of `kind` at `transform`. Never fails: an
    /// empty or missing reserve yields a freshly built instance.
    pub fn acquire(
        &mut self,
        commands: &mut Commands,
        kind: ShapeKind,
        transform: Transform,
    ) -> Entity {
        let reused =
            self.reserves.get_mut(&kind).and_then(VecDeque::pop_front);
        let Some(id) = reused else {
            let count = self.overflow.entry(kind).or_default();
            *count += 1;
            warn!("pool empty for {kind}, building overflow shape #{count}");
            let id =
                spawn_instance(commands, kind, transform, self.gravity_scale);
            commands.entity(id).insert((ActiveShape, Visibility::Visible));
            self.outstanding.insert(id, kind);
            return id;
        };
        commands
            .entity(id)
            .insert(initialize(kind, self.gravity_scale))
            .insert((transform, Visibility::Visible, ActiveShape))
            .remove::<(Pooled, DroppedShape)>();
        self.outstanding.insert(id, kind);
        id
    }

    /// Hide `id`, turn its physics off and put it back in the reserve.
    pub fn release(
        &mut self,
        commands: &mut Commands,
        id: Entity,
        kind: ShapeKind,
    ) {
        self.outstanding.remove(&id);
        let reserve = self.reserves.entry(kind).or_default();
        if reserve.contains(&id) {
            return;
        }
        commands
            .entity(id)
            .insert(initialize(kind, self.gravity_scale))
            .insert((Pooled, Visibility::Hidden))
            .remove::<(ActiveShape, DroppedShape)>();
        reserve.push_back(id);
    }

    /// Release every outstanding instance, active and dropped alike.
    pub fn release_all(&mut self, commands: &mut Commands) {
        let outstanding: Vec<_> = self.outstanding.drain().collect();
        for (id, kind) in outstanding {
            self.release(commands, id, kind);
        }
    }
}

fn spawn_instance(
    commands: &mut Commands,
    kind: ShapeKind,
    transform: Transform,
    gravity_scale: f32,
) -> Entity {
    commands
        .spawn(ShapeBodyBundle::new(kind))
        .insert(initialize(kind, gravity_scale))
        .insert(SpatialBundle::from_transform(transform))
        .insert(Name::new(format!("{kind} shape")))
        .id()
}

pub fn prewarm_pools(
    mut commands: Commands,
    config: Res<StackerConfig>,
    mut pool: ResMut<ShapePool>,
) {
    pool.gravity_scale = config.gravity_scale;
    for &(kind, size) in config.pools.iter() {
        pool.prewarm(&mut commands, kind, size, config.gravity_scale);
    }
    info!("Prewarmed shape pools: {:?}", config.pools);
}

/// A kind the spawner may draw but that has no pool is a configuration
/// error. It is taken out of rotation rather than failing later.
pub fn validate_pools(
    pool: Res<ShapePool>,
    mut session: ResMut<GameSession>,
) {
    for kind in ShapeKind::ALL {
        if session.is_available(kind) && !pool.has_pool(kind) {
            warn!("no pool configured for {kind}, removing it from play");
            session.set_available(KindChange::Remove, kind);
        }
    }
    if !pool.has_pool(ShapeKind::DEFAULT) {
        warn!(
            "fallback kind {} has no pool, it will use overflow instances",
            ShapeKind::DEFAULT
        );
    }
}
