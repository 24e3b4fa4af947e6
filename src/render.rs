//! Lyon outlines for shapes. Visuals are attached once, when a shape entity
//! is first built; pooled reuse keeps them.

use bevy::prelude::*;
use bevy_prototype_lyon::prelude::*;
use stacker_rs::shape::{geometry, Shape};

pub const OUTLINE_THICKNESS: f32 = 0.04;

pub fn plugin(app: &mut App) {
    app.add_systems(PostUpdate, attach_visuals);
}

fn attach_visuals(
    mut commands: Commands,
    added: Query<(Entity, &Shape, &Transform, &Visibility), Added<Shape>>,
) {
    for (id, shape, transform, visibility) in added.iter() {
        let outline = shapes::Polygon {
            points: geometry::outline(shape.kind),
            closed: true,
        };
        commands.entity(id).insert((
            ShapeBundle {
                path: GeometryBuilder::build_as(&outline),
                spatial: SpatialBundle {
                    transform: *transform,
                    visibility: *visibility,
                    ..default()
                },
                ..default()
            },
            Fill::color(shape.kind.color()),
            Stroke::new(Color::BLACK, OUTLINE_THICKNESS),
        ));
    }
}
