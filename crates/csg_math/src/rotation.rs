//! Rotation matrices for the three coordinate planes.
//!
//! Objects and the camera are rotated "in a plane" rather than about an axis.
//! The xz plane follows the opposite handedness of a y-axis rotation.

use std::fmt;
use std::str::FromStr;

use glam::Mat3;
use thiserror::Error;

/// Error returned when a rotation plane name is not one of `xy`, `yz`, `xz`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown rotation plane '{0}' (expected xy, yz or xz)")]
pub struct ParsePlaneError(pub String);

/// The coordinate plane a rotation acts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationPlane {
    Xy,
    Yz,
    Xz,
}

impl RotationPlane {
    pub fn as_str(&self) -> &'static str {
        match self {
            RotationPlane::Xy => "xy",
            RotationPlane::Yz => "yz",
            RotationPlane::Xz => "xz",
        }
    }
}

impl fmt::Display for RotationPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RotationPlane {
    type Err = ParsePlaneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xy" => Ok(RotationPlane::Xy),
            "yz" => Ok(RotationPlane::Yz),
            "xz" => Ok(RotationPlane::Xz),
            _ => Err(ParsePlaneError(s.to_string())),
        }
    }
}

/// Rotation matrix for `angle` radians in `plane`.
///
/// With `inverse` set the angle is negated, which for these orthonormal
/// matrices is the same as transposing.
pub fn plane_rotation(angle: f32, plane: RotationPlane, inverse: bool) -> Mat3 {
    let angle = if inverse { -angle } else { angle };
    match plane {
        RotationPlane::Xy => Mat3::from_rotation_z(angle),
        RotationPlane::Yz => Mat3::from_rotation_x(angle),
        RotationPlane::Xz => Mat3::from_rotation_y(-angle),
    }
}

/// Forward and inverse rotation matrices for `angle` radians in `plane`.
pub fn rotation_pair(angle: f32, plane: RotationPlane) -> (Mat3, Mat3) {
    (
        plane_rotation(angle, plane, false),
        plane_rotation(angle, plane, true),
    )
}
