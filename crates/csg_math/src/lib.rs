// Re-export glam for convenience
pub use glam::*;

// CSG math types
mod ray;
mod rotation;
pub use ray::Ray;
pub use rotation::{plane_rotation, rotation_pair, ParsePlaneError, RotationPlane};
