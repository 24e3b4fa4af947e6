//! Outlines and colliders per shape kind.
//!
//! Every outline fits in a circle of `SHAPE_RADIUS` (the square's corners
//! excepted) and is centered on the local origin. Non-convex outlines get
//! their convex hull as collider.

use std::f32::consts::{PI, TAU};

use bevy::prelude::*;
use bevy_rapier2d::prelude::Collider;

use super::ShapeKind;

pub const SHAPE_RADIUS: f32 = 0.5;
pub const SQUARE_HALF_EXTENT: f32 = 0.45;

const CIRCLE_SEGMENTS: usize = 24;
const CURVE_SAMPLES: usize = 48;
const STAR_POINTS: usize = 5;
const STAR_INNER_RATIO: f32 = 0.45;
const ROSE_PETALS: f32 = 5.0;

pub fn outline(kind: ShapeKind) -> Vec<Vec2> {
    match kind {
        ShapeKind::Circle => circle(SHAPE_RADIUS, CIRCLE_SEGMENTS),
        ShapeKind::Square => {
            let h = SQUARE_HALF_EXTENT;
            vec![
                Vec2::new(-h, -h),
                Vec2::new(h, -h),
                Vec2::new(h, h),
                Vec2::new(-h, h),
            ]
        }
        ShapeKind::Star => star(),
        ShapeKind::Heart => heart(),
        ShapeKind::Rose => rose(),
        ShapeKind::Arrow => arrow(),
    }
}

pub fn collider(kind: ShapeKind) -> Collider {
    match kind {
        ShapeKind::Circle => Collider::ball(SHAPE_RADIUS),
        ShapeKind::Square => {
            Collider::cuboid(SQUARE_HALF_EXTENT, SQUARE_HALF_EXTENT)
        }
        _ => Collider::convex_hull(&outline(kind)).unwrap_or_else(|| {
            warn!("convex hull failed for {kind}, using a ball collider");
            Collider::ball(SHAPE_RADIUS)
        }),
    }
}

fn circle(radius: f32, segments: usize) -> Vec<Vec2> {
    (0..segments)
        .map(|i| {
            let theta = TAU * i as f32 / segments as f32;
            Vec2::from_angle(theta) * radius
        })
        .collect()
}

fn star() -> Vec<Vec2> {
    (0..STAR_POINTS * 2)
        .map(|i| {
            let theta = PI / 2.0 + PI * i as f32 / STAR_POINTS as f32;
            let r = if i % 2 == 0 {
                SHAPE_RADIUS
            } else {
                SHAPE_RADIUS * STAR_INNER_RATIO
            };
            Vec2::from_angle(theta) * r
        })
        .collect()
}

// classic parametric heart, spans roughly x in [-16, 16], y in [-17, 5]
fn heart() -> Vec<Vec2> {
    let scale = SHAPE_RADIUS / 18.0;
    (0..CURVE_SAMPLES)
        .map(|i| {
            let t = TAU * i as f32 / CURVE_SAMPLES as f32;
            let x = 16.0 * t.sin().powi(3);
            let y = 13.0 * t.cos()
                - 5.0 * (2.0 * t).cos()
                - 2.0 * (3.0 * t).cos()
                - (4.0 * t).cos();
            Vec2::new(x, y + 6.0) * scale
        })
        .collect()
}

fn rose() -> Vec<Vec2> {
    (0..CURVE_SAMPLES)
        .map(|i| {
            let theta = TAU * i as f32 / CURVE_SAMPLES as f32;
            let r = SHAPE_RADIUS * (0.7 + 0.3 * (ROSE_PETALS * theta).cos());
            Vec2::from_angle(theta) * r
        })
        .collect()
}

fn arrow() -> Vec<Vec2> {
    let r = SHAPE_RADIUS;
    [
        (0.0, 1.0),
        (-0.6, 0.1),
        (-0.25, 0.1),
        (-0.25, -1.0),
        (0.25, -1.0),
        (0.25, 0.1),
        (0.6, 0.1),
    ]
    .into_iter()
    .map(|(x, y)| Vec2::new(x, y) * r)
    .collect()
}
