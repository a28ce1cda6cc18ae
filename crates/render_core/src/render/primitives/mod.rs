//! Core primitive types for rendering
//!
//! Cameras and bounding volumes shared by scene rendering and shadow planning.

pub mod bounds;
pub mod camera;

pub use bounds::BoundingSphere;
pub use camera::{Camera, Projection};
