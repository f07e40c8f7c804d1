//! Sphere tracing against a signed distance field.
//!
//! The marcher steps along the ray by the current distance value, which can
//! never overshoot the nearest surface. A march ends in one of four ways:
//! close enough to a surface (hit), started or landed inside an object,
//! stepped past the clipping distance, or ran out of iterations. Only the
//! first is a hit; the rest are reported as misses with a reason.

use csg_core::Sdf;
use csg_math::{Ray, Vec3};
use serde::{Deserialize, Serialize};

/// Ray marching configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarchConfig {
    /// Maximum number of marching steps
    pub iteration_limit: u32,
    /// Distance below which the ray counts as touching a surface
    pub precision: f32,
    /// Distance along the ray after which it counts as a miss
    pub clipping_distance: f32,
}

impl Default for MarchConfig {
    fn default() -> Self {
        Self {
            iteration_limit: 100,
            precision: 0.001,
            clipping_distance: 100.0,
        }
    }
}

/// Surface hit found by the marcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Distance from the ray origin
    pub distance: f32,
    /// Point on (within `precision` of) the surface
    pub point: Vec3,
    /// Number of distance evaluations taken
    pub steps: u32,
}

/// Why a march ended without a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    /// The field went negative: the sample point is inside an object.
    InsideObject,
    /// The ray travelled past the clipping distance.
    Clipped,
    /// The iteration budget ran out before converging.
    Exhausted,
}

/// Result of marching one ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarchOutcome {
    Hit(Hit),
    Miss(MissReason),
}

impl MarchOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, MarchOutcome::Hit(_))
    }

    pub fn hit(&self) -> Option<&Hit> {
        match self {
            MarchOutcome::Hit(hit) => Some(hit),
            MarchOutcome::Miss(_) => None,
        }
    }

    pub fn miss_reason(&self) -> Option<MissReason> {
        match self {
            MarchOutcome::Hit(_) => None,
            MarchOutcome::Miss(reason) => Some(*reason),
        }
    }
}

/// March `ray` through `field`. The ray direction must be normalized.
pub fn march<S: Sdf + ?Sized>(field: &S, ray: &Ray, config: &MarchConfig) -> MarchOutcome {
    let mut dist = 0.0_f32;

    for step in 1..=config.iteration_limit {
        let point = ray.at(dist);
        let d = field.sdf(point);

        // Inside geometry is reported as a miss, not a back-face hit
        if d < 0.0 {
            return MarchOutcome::Miss(MissReason::InsideObject);
        }

        if d < config.precision {
            return MarchOutcome::Hit(Hit {
                distance: dist,
                point,
                steps: step,
            });
        }

        dist += d;

        if dist > config.clipping_distance {
            return MarchOutcome::Miss(MissReason::Clipped);
        }
    }

    MarchOutcome::Miss(MissReason::Exhausted)
}
