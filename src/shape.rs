// shape.rs

use std::fmt;

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

pub mod components;
pub mod geometry;

use components::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Reflect)]
pub enum ShapeKind {
    Heart,
    Star,
    Circle,
    Square,
    Rose,
    Arrow,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 6] = [
        ShapeKind::Heart,
        ShapeKind::Star,
        ShapeKind::Circle,
        ShapeKind::Square,
        ShapeKind::Rose,
        ShapeKind::Arrow,
    ];

    /// Inserted whenever the available set would otherwise be empty.
    pub const DEFAULT: ShapeKind = ShapeKind::Heart;

    /// Zero based position in `ALL`, used for the 1..6 selection keys.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn color(self) -> Color {
        match self {
            ShapeKind::Heart => Color::srgb(0.90, 0.20, 0.30),
            ShapeKind::Star => Color::srgb(0.98, 0.80, 0.15),
            ShapeKind::Circle => Color::srgb(0.25, 0.60, 0.95),
            ShapeKind::Square => Color::srgb(0.35, 0.80, 0.40),
            ShapeKind::Rose => Color::srgb(0.85, 0.35, 0.75),
            ShapeKind::Arrow => Color::srgb(0.95, 0.55, 0.20),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A single droppable shape.
///
/// The flags are the whole lifecycle as far as gameplay is concerned: a fresh
/// shape is neither dropped nor simulated, `drop` flips both exactly once.
/// Pool membership is tracked by the `Pooled` marker.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Shape {
    pub kind: ShapeKind,
    dropped: bool,
    simulated: bool,
}

impl Shape {
    pub fn new(kind: ShapeKind) -> Self {
        Shape {
            kind,
            dropped: false,
            simulated: false,
        }
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped
    }

    pub fn is_simulated(&self) -> bool {
        self.simulated
    }

    /// Rotate by `delta_degrees` around z. Refused once dropped, since the
    /// physics engine owns the transform from then on.
    pub fn rotate(
        &self,
        transform: &mut Transform,
        delta_degrees: f32,
    ) -> bool {
        if self.dropped {
            return false;
        }
        transform.rotate_z(delta_degrees.to_radians());
        true
    }

    /// Returns `false` if the shape was already dropped.
    pub fn drop(&mut self) -> bool {
        if self.dropped {
            return false;
        }
        self.dropped = true;
        self.simulated = true;
        true
    }
}

/// Physics components a shape is built with once. The per-use state comes
/// from `initialize`.
#[derive(Bundle)]
pub struct ShapeBodyBundle {
    rigid_body: RigidBody,
    collider: Collider,
    restitution: Restitution,
    friction: Friction,
    ccd: Ccd,
    events: ActiveEvents,
}

impl ShapeBodyBundle {
    pub fn new(kind: ShapeKind) -> Self {
        ShapeBodyBundle {
            rigid_body: RigidBody::Dynamic,
            collider: geometry::collider(kind),
            restitution: Restitution::coefficient(0.0),
            friction: Friction::coefficient(0.8),
            ccd: Ccd::enabled(),
            events: ActiveEvents::COLLISION_EVENTS,
        }
    }
}

/// Components that put a shape, fresh or reused, back into its pre-drop
/// state: not dropped, no velocity, simulation off, `gravity_scale` ready for
/// when the body is enabled.
pub fn initialize(
    kind: ShapeKind,
    gravity_scale: f32,
) -> (Shape, Velocity, GravityScale, RigidBodyDisabled, ColliderDisabled) {
    (
        Shape::new(kind),
        Velocity::zero(),
        GravityScale(gravity_scale),
        RigidBodyDisabled,
        ColliderDisabled,
    )
}

/// Mirror `Shape::is_simulated` onto rapier.
pub fn sync_simulation(
    mut commands: Commands,
    shapes: Query<(Entity, &Shape), Changed<Shape>>,
) {
    for (entity, shape) in shapes.iter() {
        if shape.is_simulated() {
            commands
                .entity(entity)
                .remove::<(RigidBodyDisabled, ColliderDisabled)>();
        } else {
            commands
                .entity(entity)
                .insert((RigidBodyDisabled, ColliderDisabled));
        }
    }
}

/// Apply `RequestRotate` to the active shape.
pub fn rotate_active_shape(
    mut rotations: EventReader<crate::game::RequestRotate>,
    mut shapes: Query<(&Shape, &mut Transform), With<ActiveShape>>,
) {
    let Ok((shape, mut transform)) = shapes.get_single_mut() else {
        rotations.clear();
        return;
    };
    for rotation in rotations.read() {
        shape.rotate(&mut transform, rotation.0);
    }
}
