//! Collision shapes for moving game objects.
//!
//! A [`CollisionShape`] is owned by its game object, which feeds it a new
//! transform every simulation tick. Pairwise queries are issued by the game
//! loop:
//!
//! 1. [`CollisionShape::update_matrices`] once per tick per shape
//! 2. [`CollisionShape::collides`] for overlap right now
//! 3. [`CollisionShape::collides_over_time`] to also catch fast spheres that
//!    crossed each other during the tick

pub mod shape;

pub use shape::{CollisionShape, TimeSlot};
