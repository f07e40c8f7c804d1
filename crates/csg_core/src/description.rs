//! JSON scene descriptions.
//!
//! A description lists objects as CSG trees together with the edits applied
//! to them, in order, as an interactive session would have issued them:
//!
//! ```json
//! {
//!   "width": 200, "height": 150,
//!   "camera": { "position": [0, 0, -6] },
//!   "lights": [{ "position": [10, -10, 10], "color": "white" }],
//!   "objects": [{
//!     "name": "cup",
//!     "node": {
//!       "type": "difference",
//!       "left":  { "type": "cylinder", "radius": 1.0, "height": 2.0 },
//!       "right": { "type": "sphere", "radius": 0.9,
//!                  "transforms": [{ "translate": [0, 0, -0.6] }] },
//!       "transforms": [{ "rotate": { "plane": "yz", "degrees": 30 } }]
//!     }
//!   }]
//! }
//! ```

use std::path::Path;

use csg_math::{rotation_pair, RotationPlane, Vec3};
use serde::Deserialize;

use crate::{Camera, CsgNode, CsgOp, LightColor, Primitive, Scene, SceneResult};

/// Top-level scene description.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneDescription {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default)]
    pub camera: CameraDescription,
    /// When absent, the scene gets the default white light.
    #[serde(default)]
    pub lights: Option<Vec<LightDescription>>,
    #[serde(default)]
    pub objects: Vec<ObjectDescription>,
}

fn default_width() -> u32 {
    Scene::DEFAULT_RESOLUTION.0
}

fn default_height() -> u32 {
    Scene::DEFAULT_RESOLUTION.1
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraDescription {
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    /// Applied in order, each composed on top of the previous ones.
    #[serde(default)]
    pub rotations: Vec<RotationDescription>,
}

fn default_camera_position() -> [f32; 3] {
    Scene::DEFAULT_CAMERA_POSITION.to_array()
}

impl Default for CameraDescription {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            rotations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LightDescription {
    pub position: [f32; 3],
    #[serde(default)]
    pub color: LightColor,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RotationDescription {
    pub plane: String,
    pub degrees: f32,
}

impl RotationDescription {
    fn plane(&self) -> SceneResult<RotationPlane> {
        Ok(self.plane.parse()?)
    }
}

/// One edit applied to a subtree.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformDescription {
    Translate([f32; 3]),
    Rotate(RotationDescription),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectDescription {
    /// Explicit name; generated from the root's kind when absent.
    #[serde(default)]
    pub name: Option<String>,
    pub node: NodeDescription,
    /// Edits applied to the whole object once its tree is built.
    #[serde(default)]
    pub transforms: Vec<TransformDescription>,
}

/// A CSG subtree plus the edits applied to it after it is built.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeDescription {
    #[serde(flatten)]
    pub kind: NodeKindDescription,
    #[serde(default)]
    pub transforms: Vec<TransformDescription>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKindDescription {
    Box {
        length: f32,
        width: f32,
        height: f32,
    },
    Sphere {
        radius: f32,
    },
    Cylinder {
        radius: f32,
        height: f32,
    },
    Union {
        left: Box<NodeDescription>,
        right: Box<NodeDescription>,
    },
    Intersection {
        left: Box<NodeDescription>,
        right: Box<NodeDescription>,
    },
    Difference {
        left: Box<NodeDescription>,
        right: Box<NodeDescription>,
    },
}

impl NodeDescription {
    /// Build the subtree, children first, then apply this node's edits.
    pub fn build(&self) -> SceneResult<CsgNode> {
        let mut node = match &self.kind {
            NodeKindDescription::Box { length, width, height } => {
                CsgNode::leaf(Primitive::cuboid(*length, *width, *height))
            }
            NodeKindDescription::Sphere { radius } => CsgNode::leaf(Primitive::sphere(*radius)),
            NodeKindDescription::Cylinder { radius, height } => {
                CsgNode::leaf(Primitive::cylinder(*radius, *height))
            }
            NodeKindDescription::Union { left, right } => {
                CsgNode::combine(CsgOp::Union, left.build()?, right.build()?)
            }
            NodeKindDescription::Intersection { left, right } => {
                CsgNode::combine(CsgOp::Intersection, left.build()?, right.build()?)
            }
            NodeKindDescription::Difference { left, right } => {
                CsgNode::combine(CsgOp::Difference, left.build()?, right.build()?)
            }
        };

        apply_transforms(&mut node, &self.transforms)?;
        Ok(node)
    }

    /// Prefix used when the object has no explicit name.
    fn name_prefix(&self) -> String {
        match &self.kind {
            NodeKindDescription::Box { .. } => "box".to_string(),
            NodeKindDescription::Sphere { .. } => "sphere".to_string(),
            NodeKindDescription::Cylinder { .. } => "cylinder".to_string(),
            NodeKindDescription::Union { .. } => format!("combined-{}", CsgOp::Union),
            NodeKindDescription::Intersection { .. } => format!("combined-{}", CsgOp::Intersection),
            NodeKindDescription::Difference { .. } => format!("combined-{}", CsgOp::Difference),
        }
    }
}

fn apply_transforms(node: &mut CsgNode, transforms: &[TransformDescription]) -> SceneResult<()> {
    for transform in transforms {
        match transform {
            TransformDescription::Translate(v) => node.translate(Vec3::from_array(*v)),
            TransformDescription::Rotate(rotation) => {
                let (forward, inverse) =
                    rotation_pair(rotation.degrees.to_radians(), rotation.plane()?);
                node.rotate(forward, inverse);
            }
        }
    }
    Ok(())
}

impl SceneDescription {
    pub fn from_json_str(json: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a scene from this description.
    pub fn build(&self) -> SceneResult<Scene> {
        let mut camera = Camera::new(Vec3::from_array(self.camera.position));
        for rotation in &self.camera.rotations {
            camera.rotate_in_plane(rotation.degrees.to_radians(), rotation.plane()?);
        }

        let mut scene = match &self.lights {
            None => Scene::new(),
            Some(lights) => {
                let mut scene = Scene::empty();
                for light in lights {
                    scene.add_light(Vec3::from_array(light.position), light.color);
                }
                scene
            }
        }
        .with_camera(camera)
        .with_resolution(self.width, self.height);

        for object in &self.objects {
            let mut node = object.node.build()?;
            apply_transforms(&mut node, &object.transforms)?;
            match &object.name {
                Some(name) => scene.insert_object(name.clone(), node)?,
                None => {
                    scene.add_object(&object.node.name_prefix(), node);
                }
            }
        }

        log::debug!(
            "Built scene: {} objects, {} lights, {}x{}",
            scene.object_count(),
            scene.light_count(),
            scene.width,
            scene.height
        );
        Ok(scene)
    }
}

impl Scene {
    /// Parse and build a scene from a JSON description.
    pub fn from_json_str(json: &str) -> SceneResult<Scene> {
        SceneDescription::from_json_str(json)?.build()
    }

    /// Load a scene from a JSON description file.
    pub fn load_json(path: impl AsRef<Path>) -> SceneResult<Scene> {
        let path = path.as_ref();
        log::info!("Loading scene description {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
