//! Scene model: named CSG objects, colored lights, a camera and a resolution.
//!
//! The editing methods mirror the commands an interactive front end issues
//! (add, remove, translate, rotate, combine). The renderer only ever reads a
//! `&Scene`, so no edit can overlap a render pass.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use csg_math::{rotation_pair, Mat3, RotationPlane, Vec3};
use serde::{Deserialize, Serialize};

use crate::{CsgNode, CsgOp, Primitive, SceneError, SceneField, SceneResult};

/// Light color tag. Each tag selects which RGB channels the light feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightColor {
    #[default]
    White,
    Red,
    Green,
    Blue,
}

impl LightColor {
    /// Channel mask: 1 for every channel this light contributes to.
    pub fn channels(&self) -> Vec3 {
        match self {
            LightColor::White => Vec3::ONE,
            LightColor::Red => Vec3::X,
            LightColor::Green => Vec3::Y,
            LightColor::Blue => Vec3::Z,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LightColor::White => "white",
            LightColor::Red => "red",
            LightColor::Green => "green",
            LightColor::Blue => "blue",
        }
    }
}

impl fmt::Display for LightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LightColor {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" => Ok(LightColor::White),
            "red" => Ok(LightColor::Red),
            "green" => Ok(LightColor::Green),
            "blue" => Ok(LightColor::Blue),
            _ => Err(SceneError::UnknownLightColor(s.to_string())),
        }
    }
}

/// A point light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub color: LightColor,
}

impl Light {
    pub fn new(position: Vec3, color: LightColor) -> Self {
        Self { position, color }
    }
}

/// Camera pose. Looks down its local +z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Camera->world rotation applied to view-space ray directions
    pub rotation: Mat3,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Mat3::IDENTITY,
        }
    }

    /// Turn the camera by `rotation`, expressed in the camera's own frame.
    pub fn rotate(&mut self, rotation: Mat3) {
        self.rotation *= rotation;
    }

    /// Turn the camera by `angle` radians in `plane`.
    ///
    /// Camera turns use the transposed plane matrix, so a +90 degree turn in
    /// the xz plane faces +x and a positive yz turn tilts the view towards +y.
    pub fn rotate_in_plane(&mut self, angle: f32, plane: RotationPlane) {
        let (_, inverse) = rotation_pair(angle, plane);
        self.rotate(inverse);
    }

    pub fn translate(&mut self, v: Vec3) {
        self.position += v;
    }

    /// View direction in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

/// A complete scene.
#[derive(Debug, Clone)]
pub struct Scene {
    objects: BTreeMap<String, CsgNode>,
    lights: BTreeMap<String, Light>,
    pub camera: Camera,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    next_object_id: usize,
    next_light_id: usize,
}

impl Scene {
    pub const DEFAULT_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 0.0, -5.0);
    pub const DEFAULT_LIGHT_POSITION: Vec3 = Vec3::new(10.0, -10.0, 10.0);
    pub const DEFAULT_RESOLUTION: (u32, u32) = (300, 300);

    /// A scene with the default camera, one white light and no objects.
    pub fn new() -> Self {
        let mut scene = Self::empty();
        scene.add_light(Self::DEFAULT_LIGHT_POSITION, LightColor::White);
        scene
    }

    /// A scene with the default camera and resolution but no lights or objects.
    pub fn empty() -> Self {
        let (width, height) = Self::DEFAULT_RESOLUTION;
        Self {
            objects: BTreeMap::new(),
            lights: BTreeMap::new(),
            camera: Camera::new(Self::DEFAULT_CAMERA_POSITION),
            width,
            height,
            next_object_id: 0,
            next_light_id: 0,
        }
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.set_resolution(width, height);
        self
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    // Objects

    pub fn objects(&self) -> impl Iterator<Item = (&str, &CsgNode)> {
        self.objects.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn object(&self, name: &str) -> Option<&CsgNode> {
        self.objects.get(name)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Read-only distance field over every top-level object.
    pub fn field(&self) -> SceneField<'_> {
        self.objects.values().collect()
    }

    /// Add an object under an explicit name.
    pub fn insert_object(&mut self, name: impl Into<String>, node: CsgNode) -> SceneResult<()> {
        let name = name.into();
        if self.objects.contains_key(&name) {
            return Err(SceneError::DuplicateName(name));
        }
        log::info!("Added {}", name);
        self.objects.insert(name, node);
        Ok(())
    }

    /// Add an object named `{prefix}{id}` and return the name.
    pub fn add_object(&mut self, prefix: &str, node: CsgNode) -> String {
        let name = loop {
            let candidate = format!("{}{}", prefix, self.next_object_id);
            self.next_object_id += 1;
            if !self.objects.contains_key(&candidate) {
                break candidate;
            }
        };
        log::info!("Added {}", name);
        self.objects.insert(name.clone(), node);
        name
    }

    /// Add a primitive as a new top-level leaf named after its shape.
    pub fn add_primitive(&mut self, primitive: Primitive) -> String {
        let prefix = primitive.shape().name();
        self.add_object(prefix, CsgNode::leaf(primitive))
    }

    pub fn add_box(&mut self, length: f32, width: f32, height: f32) -> String {
        self.add_primitive(Primitive::cuboid(length, width, height))
    }

    pub fn add_sphere(&mut self, radius: f32) -> String {
        self.add_primitive(Primitive::sphere(radius))
    }

    pub fn add_cylinder(&mut self, radius: f32, height: f32) -> String {
        self.add_primitive(Primitive::cylinder(radius, height))
    }

    pub fn remove_object(&mut self, name: &str) -> SceneResult<CsgNode> {
        let node = self.take_object(name)?;
        log::info!("Removed object {}", name);
        Ok(node)
    }

    /// Detach an object without logging a removal.
    fn take_object(&mut self, name: &str) -> SceneResult<CsgNode> {
        self.objects
            .remove(name)
            .ok_or_else(|| SceneError::ObjectNotFound(name.to_string()))
    }

    fn object_mut(&mut self, name: &str) -> SceneResult<&mut CsgNode> {
        self.objects
            .get_mut(name)
            .ok_or_else(|| SceneError::ObjectNotFound(name.to_string()))
    }

    pub fn translate_object(&mut self, name: &str, v: Vec3) -> SceneResult<()> {
        self.object_mut(name)?.translate(v);
        log::info!("Translated object {} by {:?}", name, v);
        Ok(())
    }

    /// Rotate an object by `degrees` in `plane` about its own center.
    pub fn rotate_object(
        &mut self,
        name: &str,
        degrees: f32,
        plane: RotationPlane,
    ) -> SceneResult<()> {
        let (forward, inverse) = rotation_pair(degrees.to_radians(), plane);
        self.object_mut(name)?.rotate(forward, inverse);
        log::info!("Rotated object {} by {} degrees in the {} plane", name, degrees, plane);
        Ok(())
    }

    /// Combine two top-level objects into `combined-{op}{id}`.
    ///
    /// Both inputs are consumed and leave the object map. On error the scene
    /// is unchanged.
    pub fn combine(&mut self, op: CsgOp, left: &str, right: &str) -> SceneResult<String> {
        if left == right {
            return Err(SceneError::SelfCombine(left.to_string()));
        }
        for name in [left, right] {
            if !self.objects.contains_key(name) {
                return Err(SceneError::ObjectNotFound(name.to_string()));
            }
        }
        let left_node = self.take_object(left)?;
        let right_node = self.take_object(right)?;
        let name = self.add_object(
            &format!("combined-{}", op),
            CsgNode::combine(op, left_node, right_node),
        );
        log::info!("Combined objects {} and {} using {} to create {}", left, right, op, name);
        Ok(name)
    }

    // Lights

    pub fn lights(&self) -> impl Iterator<Item = (&str, &Light)> {
        self.lights.iter().map(|(name, light)| (name.as_str(), light))
    }

    pub fn light(&self, name: &str) -> Option<&Light> {
        self.lights.get(name)
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Add a light named `{color}{id}` and return the name.
    pub fn add_light(&mut self, position: Vec3, color: LightColor) -> String {
        let name = format!("{}{}", color, self.next_light_id);
        self.next_light_id += 1;
        log::info!("Added {} light source at {:?}", color, position);
        self.lights.insert(name.clone(), Light::new(position, color));
        name
    }

    pub fn remove_light(&mut self, name: &str) -> SceneResult<Light> {
        let light = self
            .lights
            .remove(name)
            .ok_or_else(|| SceneError::LightNotFound(name.to_string()))?;
        log::info!("Removed light source {}", name);
        Ok(light)
    }

    // Camera and output

    pub fn move_camera(&mut self, v: Vec3) {
        self.camera.translate(v);
        log::info!("Moved camera by {:?}", v);
    }

    pub fn rotate_camera(&mut self, degrees: f32, plane: RotationPlane) {
        self.camera.rotate_in_plane(degrees.to_radians(), plane);
        log::info!("Rotated camera by {} degrees in the {} plane", degrees, plane);
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        log::info!("Changed resolution to {}x{}", width, height);
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Sdf;

    #[test]
    fn test_scene_defaults() {
        let scene = Scene::new();
        assert_eq!(scene.camera.position, Vec3::new(0.0, 0.0, -5.0));
        assert_eq!(scene.camera.rotation, Mat3::IDENTITY);
        assert_eq!((scene.width, scene.height), (300, 300));
        assert_eq!(scene.light_count(), 1);
        let light = scene.light("white0").expect("default light");
        assert_eq!(light.position, Vec3::new(10.0, -10.0, 10.0));
        assert_eq!(light.color, LightColor::White);
        assert_eq!(scene.object_count(), 0);
    }

    #[test]
    fn test_add_names_share_one_counter() {
        let mut scene = Scene::empty();
        assert_eq!(scene.add_sphere(1.0), "sphere0");
        assert_eq!(scene.add_box(1.0, 2.0, 3.0), "box1");
        assert_eq!(scene.add_cylinder(1.0, 2.0), "cylinder2");
        assert_eq!(scene.object_count(), 3);
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut scene = Scene::empty();
        scene
            .insert_object("ball", CsgNode::leaf(Primitive::sphere(1.0)))
            .expect("first insert");
        let err = scene
            .insert_object("ball", CsgNode::leaf(Primitive::sphere(2.0)))
            .unwrap_err();
        assert!(matches!(err, SceneError::DuplicateName(name) if name == "ball"));
    }

    #[test]
    fn test_combine_consumes_inputs() {
        let mut scene = Scene::empty();
        let a = scene.add_sphere(1.0);
        let b = scene.add_box(1.0, 1.0, 1.0);
        scene.translate_object(&b, Vec3::new(0.5, 0.0, 0.0)).expect("translate");

        let name = scene.combine(CsgOp::Difference, &a, &b).expect("combine");
        assert_eq!(name, "combined-difference2");
        assert_eq!(scene.object_count(), 1);
        assert!(scene.object(&a).is_none());
        assert!(scene.object(&b).is_none());

        let node = scene.object(&name).expect("combined node");
        assert_eq!(node.op(), Some(CsgOp::Difference));
        // Center of a difference is the kept side's center
        assert_eq!(node.center(), Vec3::ZERO);
    }

    #[test]
    fn test_combine_errors_leave_scene_untouched() {
        let mut scene = Scene::empty();
        let a = scene.add_sphere(1.0);

        assert!(matches!(
            scene.combine(CsgOp::Union, &a, "missing"),
            Err(SceneError::ObjectNotFound(_))
        ));
        assert!(matches!(
            scene.combine(CsgOp::Union, &a, &a),
            Err(SceneError::SelfCombine(_))
        ));
        assert!(scene.object(&a).is_some());
        assert_eq!(scene.object_count(), 1);
    }

    #[test]
    fn test_translate_and_rotate_by_name() {
        let mut scene = Scene::empty();
        let name = scene.add_cylinder(0.5, 4.0);
        scene.translate_object(&name, Vec3::new(1.0, 0.0, 0.0)).expect("translate");
        scene.rotate_object(&name, 90.0, RotationPlane::Yz).expect("rotate");

        let node = scene.object(&name).expect("object");
        // Lying along y through (1, 0, 0)
        assert!(node.sdf(Vec3::new(1.0, 2.0, 0.0)).abs() < 1e-4);

        assert!(matches!(
            scene.rotate_object("nope", 10.0, RotationPlane::Xy),
            Err(SceneError::ObjectNotFound(_))
        ));
    }

    #[test]
    fn test_lights() {
        let mut scene = Scene::new();
        let red = scene.add_light(Vec3::new(0.0, 5.0, 0.0), LightColor::Red);
        assert_eq!(red, "red1");
        assert_eq!(scene.light_count(), 2);

        let removed = scene.remove_light("white0").expect("remove");
        assert_eq!(removed.color, LightColor::White);
        assert!(matches!(
            scene.remove_light("white0"),
            Err(SceneError::LightNotFound(_))
        ));
    }

    #[test]
    fn test_light_color_parsing() {
        assert_eq!("Red".parse::<LightColor>().expect("red"), LightColor::Red);
        assert_eq!(LightColor::Blue.channels(), Vec3::Z);
        assert_eq!(LightColor::White.channels(), Vec3::ONE);
        assert!(matches!(
            "purple".parse::<LightColor>(),
            Err(SceneError::UnknownLightColor(_))
        ));
    }

    #[test]
    fn test_camera_rotation_composes() {
        let mut scene = Scene::empty();
        scene.rotate_camera(90.0, RotationPlane::Yz);
        assert!((scene.camera.forward() - Vec3::Y).length() < 1e-5);
        scene.rotate_camera(-90.0, RotationPlane::Yz);
        assert!((scene.camera.forward() - Vec3::Z).length() < 1e-5);

        scene.move_camera(Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(scene.camera.position, Vec3::new(0.0, 1.0, -5.0));
    }

    #[test]
    fn test_camera_pitch_after_yaw_tilts_view() {
        let mut scene = Scene::empty();
        scene.rotate_camera(90.0, RotationPlane::Xz);
        assert!((scene.camera.forward() - Vec3::X).length() < 1e-5);

        // The second turn acts in the camera's frame, not the world's
        scene.rotate_camera(30.0, RotationPlane::Yz);
        let expected = Vec3::new(30f32.to_radians().cos(), 0.5, 0.0);
        assert!((scene.camera.forward() - expected).length() < 1e-5);
    }

    #[test]
    fn test_field_covers_all_objects() {
        let mut scene = Scene::empty();
        let far = scene.add_sphere(1.0);
        scene.translate_object(&far, Vec3::new(20.0, 0.0, 0.0)).expect("translate");
        scene.add_sphere(1.0);

        let field = scene.field();
        assert_eq!(field.len(), 2);
        assert!((field.sdf(Vec3::new(3.0, 0.0, 0.0)) - 2.0).abs() < 1e-5);
        assert_eq!(Scene::empty().field().sdf(Vec3::ZERO), 1000.0);
    }
}
