//! CSG Core - Scene model and signed distance fields.
//!
//! This crate provides:
//!
//! - **Primitives**: box, sphere and cylinder distance functions with rigid transforms
//! - **CSG trees**: union / intersection / difference with pivot-aware rotation
//! - **Scenes**: named objects, colored lights, camera, resolution
//! - **Descriptions**: JSON scene files
//!
//! # Example
//!
//! ```
//! use csg_core::{CsgNode, Primitive, Sdf};
//! use csg_math::Vec3;
//!
//! let ball = CsgNode::leaf(Primitive::sphere(1.0));
//! let mut cutter = CsgNode::leaf(Primitive::cuboid(1.0, 1.0, 1.0));
//! cutter.translate(Vec3::new(1.0, 0.0, 0.0));
//! let bitten = CsgNode::difference(ball, cutter);
//!
//! assert!(bitten.sdf(Vec3::new(0.9, 0.0, 0.0)) > 0.0);
//! assert!(bitten.sdf(Vec3::new(-0.9, 0.0, 0.0)) < 0.0);
//! ```

mod description;
mod error;
mod field;
mod node;
mod primitive;
mod scene;

pub use description::{
    CameraDescription, LightDescription, NodeDescription, NodeKindDescription,
    ObjectDescription, RotationDescription, SceneDescription, TransformDescription,
};
pub use error::{SceneError, SceneResult};
pub use field::{scene_sdf, SceneField, Sdf, EMPTY_SCENE_DISTANCE};
pub use node::{CsgNode, CsgOp, NodeKind};
pub use primitive::{Primitive, Shape};
pub use scene::{Camera, Light, LightColor, Scene};
