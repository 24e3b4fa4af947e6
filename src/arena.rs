// arena.rs

use bevy::prelude::*;
use bevy_prototype_lyon::{
    draw::{Fill, Stroke},
    entity::ShapeBundle,
    geometry::GeometryBuilder,
    shapes,
};
use bevy_rapier2d::prelude::*;
use stacker_rs::config::StackerConfig;
use stacker_rs::death::DeathZone;

use crate::render::OUTLINE_THICKNESS;

const PLATFORM_HALF_EXTENTS: Vec2 = Vec2::new(1.75, 0.25);
const PLATFORM_Y: f32 = -3.0;
/// Wide enough to catch anything sliding off either edge.
const DEATH_ZONE_HALF_EXTENTS: Vec2 = Vec2::new(20.0, 0.5);

#[derive(Component)]
pub struct Ground;

pub fn plugin(app: &mut App) {
    app.add_systems(Startup, (spawn_arena, spawn_death_zone));
}

pub fn spawn_arena(mut commands: Commands) {
    let ground_shape = shapes::Rectangle {
        extents: PLATFORM_HALF_EXTENTS * 2.0 - Vec2::splat(OUTLINE_THICKNESS),
        ..Default::default()
    };
    /* Create the platform. */
    commands
        .spawn((
            ShapeBundle {
                path: GeometryBuilder::build_as(&ground_shape),
                spatial: SpatialBundle::from_transform(Transform::from_xyz(
                    0.0, PLATFORM_Y, 0.0,
                )),
                ..default()
            },
            Fill::color(Color::srgb(0.55, 0.50, 0.45)),
            Stroke::new(Color::BLACK, OUTLINE_THICKNESS),
        ))
        .insert(PlatformPhysicsBundle::new())
        .insert(Ground)
        .insert(Name::new("Platform"));
}

/// The sensor's top edge sits on the fall threshold.
pub fn spawn_death_zone(mut commands: Commands, config: Res<StackerConfig>) {
    let y = config.fall_threshold - DEATH_ZONE_HALF_EXTENTS.y;
    commands
        .spawn(Collider::cuboid(
            DEATH_ZONE_HALF_EXTENTS.x,
            DEATH_ZONE_HALF_EXTENTS.y,
        ))
        .insert(Sensor)
        .insert(ActiveEvents::COLLISION_EVENTS)
        .insert(TransformBundle::from(Transform::from_xyz(0.0, y, 0.0)))
        .insert(DeathZone)
        .insert(Name::new("Death zone"));
}

#[derive(Bundle)]
pub struct PlatformPhysicsBundle {
    rigid_body: RigidBody,
    collider: Collider,
    friction: Friction,
    restitution: Restitution,
}

impl PlatformPhysicsBundle {
    pub fn new() -> Self {
        PlatformPhysicsBundle {
            rigid_body: RigidBody::Fixed,
            collider: Collider::cuboid(
                PLATFORM_HALF_EXTENTS.x,
                PLATFORM_HALF_EXTENTS.y,
            ),
            restitution: Restitution::coefficient(0.0),
            friction: Friction {
                coefficient: 0.9,
                combine_rule: CoefficientCombineRule::Max,
            },
        }
    }
}
