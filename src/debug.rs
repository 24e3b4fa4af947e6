use bevy::input::common_conditions::{input_just_pressed, input_toggle_active};
use bevy::prelude::*;
use bevy_dev_tools::fps_overlay::FpsOverlayPlugin;
use bevy_inspector_egui::quick::WorldInspectorPlugin;
use bevy_rapier2d::prelude::{DebugRenderContext, GravityScale, Velocity};
use stacker_rs::pool::ShapePool;
use stacker_rs::shape::{Shape, ShapeKind};
use stacker_rs::spawner::Spawner;

/// F1 inspector, F2 collider outlines, F3 dumps the active shape and pools.
pub fn plugin(app: &mut App) {
    app.add_plugins(
        WorldInspectorPlugin::new()
            .run_if(input_toggle_active(false, KeyCode::F1)),
    )
    .add_plugins(FpsOverlayPlugin::default())
    .add_systems(
        Update,
        (
            toggle_debug_render.run_if(input_just_pressed(KeyCode::F2)),
            dbg_active_shape.run_if(input_just_pressed(KeyCode::F3)),
        ),
    );
}

fn toggle_debug_render(mut context: ResMut<DebugRenderContext>) {
    context.enabled = !context.enabled;
}

fn dbg_active_shape(
    spawner: Res<Spawner>,
    pool: Res<ShapePool>,
    shapes: Query<(&Shape, &Transform, &Velocity, &GravityScale)>,
) {
    dbg!(spawner.phase(), spawner.speed(), spawner.direction());
    if let Some((shape, transform, velocity, gravity)) =
        spawner.active().and_then(|id| shapes.get(id).ok())
    {
        dbg!(shape, transform.translation, velocity, gravity);
    }
    for kind in ShapeKind::ALL {
        dbg!(kind, pool.reserved(kind), pool.overflow_count(kind));
    }
}
