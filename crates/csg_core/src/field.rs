//! The signed-distance capability shared by primitives, CSG trees and scenes.

use csg_math::{Ray, Vec3};

use crate::CsgNode;

/// Distance reported for a scene with no objects.
///
/// Large enough that a ray steps straight past any sane clipping distance.
pub const EMPTY_SCENE_DISTANCE: f32 = 1000.0;

/// Anything that can report a signed distance to its surface.
///
/// Negative inside, zero on the surface, positive outside.
pub trait Sdf: Send + Sync {
    fn sdf(&self, point: Vec3) -> f32;
}

impl<T: Sdf + ?Sized> Sdf for &T {
    fn sdf(&self, point: Vec3) -> f32 {
        (**self).sdf(point)
    }
}

/// Signed distance over a set of objects: the minimum over all of them, or
/// [`EMPTY_SCENE_DISTANCE`] when the set is empty.
pub fn scene_sdf(objects: &[&CsgNode], point: Vec3) -> f32 {
    objects
        .iter()
        .map(|object| object.sdf(point))
        .reduce(f32::min)
        .unwrap_or(EMPTY_SCENE_DISTANCE)
}

/// A borrowed view over the top-level objects of a scene.
#[derive(Debug, Clone, Default)]
pub struct SceneField<'a> {
    objects: Vec<&'a CsgNode>,
}

impl<'a> SceneField<'a> {
    pub fn new(objects: Vec<&'a CsgNode>) -> Self {
        Self { objects }
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the field has no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[&'a CsgNode] {
        &self.objects
    }

    /// Keep only the objects whose bounding spheres the ray's line passes through.
    pub fn culled_for(&self, ray: &Ray) -> SceneField<'a> {
        SceneField {
            objects: self
                .objects
                .iter()
                .copied()
                .filter(|object| object.bounding_sphere_intersects(ray))
                .collect(),
        }
    }
}

impl<'a> FromIterator<&'a CsgNode> for SceneField<'a> {
    fn from_iter<I: IntoIterator<Item = &'a CsgNode>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Sdf for SceneField<'_> {
    fn sdf(&self, point: Vec3) -> f32 {
        scene_sdf(&self.objects, point)
    }
}
