//! Local ambient + diffuse shading.
//!
//! Normals come from central differences on the distance field. Lights are
//! not shadow-tested, so they shine through occluders.

use csg_core::{Light, Sdf};
use csg_math::Vec3;
use serde::{Deserialize, Serialize};

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// 8-bit RGB pixel.
pub type Rgb = [u8; 3];

/// Shading configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingConfig {
    /// Finite-difference step for normal estimation
    pub epsilon: f32,
    /// Light every surface receives regardless of orientation
    pub ambient: f32,
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.001,
            ambient: 0.1,
        }
    }
}

/// Estimate the surface normal at `point` from the field's gradient.
///
/// Takes six distance evaluations. Returns the zero vector where the
/// gradient vanishes.
pub fn estimate_normal<S: Sdf + ?Sized>(field: &S, point: Vec3, epsilon: f32) -> Vec3 {
    let dx = Vec3::new(epsilon, 0.0, 0.0);
    let dy = Vec3::new(0.0, epsilon, 0.0);
    let dz = Vec3::new(0.0, 0.0, epsilon);

    let gradient = Vec3::new(
        field.sdf(point + dx) - field.sdf(point - dx),
        field.sdf(point + dy) - field.sdf(point - dy),
        field.sdf(point + dz) - field.sdf(point - dz),
    );

    let normal = gradient.normalize_or_zero();
    if normal == Vec3::ZERO {
        log::trace!("Degenerate normal at {:?}", point);
    }
    normal
}

/// Brightness in [0, 1] contributed by one light: ambient plus Lambert.
pub fn light_intensity(normal: Vec3, point: Vec3, light_position: Vec3, ambient: f32) -> f32 {
    let light_direction = (light_position - point).normalize_or_zero();
    let diffuse = normal.dot(light_direction).max(0.0);
    (ambient + diffuse).min(1.0)
}

/// Accumulate every light's intensity into the channels its color selects.
///
/// Lights add up per channel and each channel saturates at 1.
pub fn shade<'a>(
    normal: Vec3,
    point: Vec3,
    lights: impl IntoIterator<Item = &'a Light>,
    config: &ShadingConfig,
) -> Color {
    lights.into_iter().fold(Color::ZERO, |color, light| {
        let intensity = light_intensity(normal, point, light.position, config.ambient);
        (color + light.color.channels() * intensity).min(Color::ONE)
    })
}

/// Quantize a color to 8 bits per channel, clamping to [0, 1] and truncating.
pub fn color_to_rgb(color: Color) -> Rgb {
    let c = color.clamp(Color::ZERO, Color::ONE) * 255.0;
    [c.x as u8, c.y as u8, c.z as u8]
}
