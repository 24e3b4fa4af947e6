//! Tuning constants and the `StackerConfig` resource built from them.
//!
//! World units are meters; rapier runs with one pixel per meter and the camera
//! scales the view, so every value here is in world units.

use std::path::PathBuf;

use bevy::prelude::*;

use crate::shape::ShapeKind;

/// Visible world height. The camera keeps this fixed regardless of window size.
pub const WORLD_HEIGHT: f32 = 14.0;

pub const SPAWN_HEIGHT: f32 = 4.0;
/// Absolute horizontal bound for the oscillating shape.
pub const X_LIMIT: f32 = 2.5;
pub const DROP_COOLDOWN_SECS: f32 = 0.5;
pub const BASE_SPEED: f32 = 8.0;
pub const SPEED_INCREMENT: f32 = 0.5;
pub const SCORE_PER_DROP: u32 = 10;
/// Applied once physics is enabled for a dropped shape.
pub const GRAVITY_SCALE: f32 = 2.0;
/// Dropped shapes below this height end the round.
pub const FALL_THRESHOLD: f32 = -6.0;
pub const POOL_SIZE: usize = 20;

/// Degrees per pixel of horizontal mouse drag.
pub const DRAG_ROTATION_SENSITIVITY: f32 = 0.5;
/// Degrees per second while a rotate key is held.
pub const KEY_ROTATION_SPEED: f32 = 100.0;

pub const HIGH_SCORE_PATH_VAR: &str = "STACKER_HIGH_SCORE_PATH";
pub const DEFAULT_HIGH_SCORE_PATH: &str = "high_score.txt";

#[derive(Resource, Debug, Clone)]
pub struct StackerConfig {
    pub spawn_point: Vec2,
    pub x_limit: f32,
    pub drop_cooldown: f32,
    pub base_speed: f32,
    pub speed_increment: f32,
    pub score_per_drop: u32,
    pub gravity_scale: f32,
    pub fall_threshold: f32,
    pub drag_rotation_sensitivity: f32,
    pub key_rotation_speed: f32,
    /// Reserve size per shape kind. A kind missing here has no pool.
    pub pools: Vec<(ShapeKind, usize)>,
}

impl Default for StackerConfig {
    fn default() -> Self {
        StackerConfig {
            spawn_point: Vec2::new(0.0, SPAWN_HEIGHT),
            x_limit: X_LIMIT,
            drop_cooldown: DROP_COOLDOWN_SECS,
            base_speed: BASE_SPEED,
            speed_increment: SPEED_INCREMENT,
            score_per_drop: SCORE_PER_DROP,
            gravity_scale: GRAVITY_SCALE,
            fall_threshold: FALL_THRESHOLD,
            drag_rotation_sensitivity: DRAG_ROTATION_SENSITIVITY,
            key_rotation_speed: KEY_ROTATION_SPEED,
            pools: ShapeKind::ALL.iter().map(|&k| (k, POOL_SIZE)).collect(),
        }
    }
}

impl StackerConfig {
    pub fn pool_size(&self, kind: ShapeKind) -> Option<usize> {
        self.pools
            .iter()
            .find_map(|&(k, size)| (k == kind).then_some(size))
    }
}

/// Resolve the high score file, honoring `STACKER_HIGH_SCORE_PATH`.
pub fn high_score_path() -> PathBuf {
    std::env::var_os(HIGH_SCORE_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_HIGH_SCORE_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pools_cover_every_kind() {
        let config = StackerConfig::default();
        for kind in ShapeKind::ALL {
            assert_eq!(config.pool_size(kind), Some(POOL_SIZE));
        }
    }

    #[test]
    fn missing_pool_is_none() {
        let config = StackerConfig {
            pools: vec![(ShapeKind::Star, 3)],
            ..Default::default()
        };
        assert_eq!(config.pool_size(ShapeKind::Star), Some(3));
        assert_eq!(config.pool_size(ShapeKind::Rose), None);
    }
}
