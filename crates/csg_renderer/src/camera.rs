//! Camera ray generation.

use csg_core::Camera;
use csg_math::{Mat3, Ray, Vec3};

/// Default field of view: 60 degrees.
pub const DEFAULT_FOV: f32 = std::f32::consts::FRAC_PI_3;

/// Generates one primary ray per pixel for a fixed camera and resolution.
///
/// Pixel `(x, y)` maps to normalized device coordinates
/// `(2x/width - 1, 2y/height - 1)`, so row 0 looks towards camera-space -y.
#[derive(Debug, Clone, Copy)]
pub struct CameraRays {
    position: Vec3,
    rotation: Mat3,
    width: u32,
    height: u32,
    aspect: f32,
    /// tan(fov / 2)
    half_extent: f32,
}

impl CameraRays {
    /// `fov` is in radians and applies to the vertical axis; the horizontal
    /// extent is scaled by the aspect ratio.
    pub fn new(camera: &Camera, width: u32, height: u32, fov: f32) -> Self {
        let aspect = if height > 0 {
            width as f32 / height as f32
        } else {
            1.0
        };
        Self {
            position: camera.position,
            rotation: camera.rotation,
            width,
            height,
            aspect,
            half_extent: (fov / 2.0).tan(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Generate the ray for pixel (x, y).
    pub fn ray(&self, x: u32, y: u32) -> Ray {
        let ndc_x = (x as f32 / self.width as f32) * 2.0 - 1.0;
        let ndc_y = (y as f32 / self.height as f32) * 2.0 - 1.0;

        let view = Vec3::new(
            ndc_x * self.aspect * self.half_extent,
            ndc_y * self.half_extent,
            1.0,
        );

        Ray::new(self.position, self.rotation * view)
    }
}
