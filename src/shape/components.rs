//! # Components
//!
//! Nominal components to label shape lifecycle states.
//!
//! A shape is in exactly one of three places: waiting in the pool (`Pooled`),
//! oscillating under the spawner (`ActiveShape`), or lying on the field
//! after its drop (`DroppedShape`). The pool and spawner move the markers,
//! queries filter on them instead of scanning every shape.

use bevy::ecs::component::Component;

/// Hidden, physics disabled, sitting in a `ShapePool` reserve.
#[derive(Component, Debug)]
pub struct Pooled;

/// The single shape the spawner is oscillating.
#[derive(Component, Debug)]
pub struct ActiveShape;

/// Dropped and simulated. Watched by the death detector.
#[derive(Component, Debug)]
pub struct DroppedShape;
