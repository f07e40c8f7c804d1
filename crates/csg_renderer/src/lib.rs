//! CSG Renderer - Sphere Tracing
//!
//! A CPU renderer for CSG scenes described by signed distance functions:
//! - Sphere tracing with configurable iteration budget, precision and clipping
//! - Finite-difference normals with ambient + diffuse shading over colored lights
//! - Bucketed frame rendering spread across threads with rayon

mod bucket;
mod camera;
mod error;
mod march;
mod renderer;
mod shade;

pub use bucket::{generate_buckets, render_bucket, Bucket, DEFAULT_BUCKET_SIZE};
pub use camera::{CameraRays, DEFAULT_FOV};
pub use error::{RenderError, RenderResult};
pub use march::{march, Hit, MarchConfig, MarchOutcome, MissReason};
pub use renderer::{
    render, render_cancellable, render_pixel, trace_ray, FrameSnapshot, ImageBuffer, RenderConfig,
};
pub use shade::{color_to_rgb, estimate_normal, light_intensity, shade, Color, Rgb, ShadingConfig};

/// Re-export Vec3 and common math types from csg_math
pub use csg_math::{Mat3, Ray, Vec3};
