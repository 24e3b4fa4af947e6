// setup.rs
//! Exposes setup plugin that handles:
//!
//! - window
//!
//! Simulation:
//! - physics plugin initialization, debug render starts disabled (see
//!   `debug`)
//!
//! Graphics:
//! - shape plugin
//! - camera with a fixed world height
//!

use bevy::prelude::*;
use bevy::render::camera::ScalingMode;
use bevy::window::WindowResolution;
use bevy_prototype_lyon::plugin::ShapePlugin;
use bevy_rapier2d::prelude::*;
use stacker_rs::config::WORLD_HEIGHT;

const WINDOW_WIDTH: f32 = 480.0;
const WINDOW_HEIGHT: f32 = 720.0;
/// Physics steps at 30 Hz, independent of the frame rate.
const PHYSICS_DT: f32 = 1.0 / 30.0;

pub fn plugin(app: &mut App) {
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Shape Stacker".into(),
            name: Some("stacker-rs".into()),
            resolution: WindowResolution::new(WINDOW_WIDTH, WINDOW_HEIGHT),
            ..Default::default()
        }),
        ..Default::default()
    }))
    .insert_resource(ClearColor(Color::srgb(0.12, 0.12, 0.16)))
    // one world unit per meter, the camera does the scaling
    .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
    .insert_resource(RapierConfiguration {
        timestep_mode: physics_timestep(),
        ..RapierConfiguration::new(1.0)
    })
    .add_plugins(RapierDebugRenderPlugin {
        enabled: false,
        ..Default::default()
    })
    .add_plugins(ShapePlugin)
    .add_systems(Startup, setup_graphics);
}

/// Fixed steps accumulated from virtual time, so a paused clock also pauses
/// the simulation.
pub fn physics_timestep() -> TimestepMode {
    TimestepMode::Interpolated {
        dt: PHYSICS_DT,
        time_scale: 1.0,
        substeps: 1,
    }
}

fn setup_graphics(mut commands: Commands) {
    let mut camera = Camera2dBundle::default();
    camera.projection.scaling_mode = ScalingMode::FixedVertical(WORLD_HEIGHT);
    commands.spawn(camera);
}
