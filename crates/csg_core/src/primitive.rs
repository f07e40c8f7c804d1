//! Primitive shapes and their closed-form signed distance functions.
//!
//! Every primitive is modelled centered at its own origin and carries a rigid
//! transform. The rotation is stored world->local, so it accumulates the
//! *inverse* of every rotation applied to the object.

use csg_math::{Mat3, Vec2, Vec3};

use crate::Sdf;

/// Shape parameters in the primitive's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned box with full side lengths along x, y and z.
    Box { size: Vec3 },
    Sphere { radius: f32 },
    /// Cylinder aligned to the local z axis, `height` measured end to end.
    Cylinder { radius: f32, height: f32 },
}

impl Shape {
    /// Radius of a sphere around the local origin enclosing the shape.
    pub fn bounding_radius(&self) -> f32 {
        match *self {
            Shape::Box { size } => size.length() / 2.0,
            Shape::Sphere { radius } => radius,
            Shape::Cylinder { radius, height } => Vec2::new(radius, height / 2.0).length(),
        }
    }

    /// Short lowercase name, used when naming scene objects.
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Box { .. } => "box",
            Shape::Sphere { .. } => "sphere",
            Shape::Cylinder { .. } => "cylinder",
        }
    }

    /// Signed distance for a point already in the local frame.
    fn local_sdf(&self, p: Vec3) -> f32 {
        match *self {
            Shape::Box { size } => {
                // Symmetric in every axis, so fold into the positive octant
                let q = p.abs() - size / 2.0;
                q.max(Vec3::ZERO).length() + q.max_element().min(0.0)
            }
            Shape::Sphere { radius } => p.length() - radius,
            Shape::Cylinder { radius, height } => {
                let d = Vec2::new(p.truncate().length() - radius, p.z.abs() - height / 2.0);
                d.x.max(d.y).min(0.0) + d.max(Vec2::ZERO).length()
            }
        }
    }
}

/// A shape with a rigid transform and a fixed bounding-sphere radius.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    shape: Shape,
    translation: Vec3,
    /// World->local rotation (accumulated inverse rotation)
    rotation: Mat3,
    bounding_radius: f32,
}

impl Primitive {
    /// Create an untransformed primitive.
    ///
    /// Shape parameters are not validated; degenerate sizes give degenerate
    /// distance fields.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            translation: Vec3::ZERO,
            rotation: Mat3::IDENTITY,
            bounding_radius: shape.bounding_radius().max(0.0),
        }
    }

    /// Box with side lengths along x, y and z.
    pub fn cuboid(length: f32, width: f32, height: f32) -> Self {
        Self::new(Shape::Box {
            size: Vec3::new(length, width, height),
        })
    }

    pub fn sphere(radius: f32) -> Self {
        Self::new(Shape::Sphere { radius })
    }

    pub fn cylinder(radius: f32, height: f32) -> Self {
        Self::new(Shape::Cylinder { radius, height })
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// The world->local rotation matrix.
    pub fn rotation(&self) -> Mat3 {
        self.rotation
    }

    /// Bounding-sphere radius, fixed at construction.
    pub fn bounding_radius(&self) -> f32 {
        self.bounding_radius
    }

    /// Map a world-space point into the primitive's local frame.
    #[inline]
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        self.rotation * (point - self.translation)
    }

    pub(crate) fn translate(&mut self, v: Vec3) {
        self.translation += v;
    }

    /// Compose an inverse rotation onto the stored world->local rotation.
    pub(crate) fn apply_inverse_rotation(&mut self, inverse: Mat3) {
        self.rotation *= inverse;
    }
}

impl Sdf for Primitive {
    fn sdf(&self, point: Vec3) -> f32 {
        self.shape.local_sdf(self.to_local(point))
    }
}
