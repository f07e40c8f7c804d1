//! Tiles of pixels handed to worker threads.
//!
//! Pixels need no ordering between them, so the frame is cut into square
//! tiles in row-major order and each tile becomes one rayon task.

use crate::renderer::{render_pixel, FrameSnapshot};
use crate::{RenderConfig, Rgb};

/// Default bucket edge length in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// A rectangular block of pixels, clipped to the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Image coordinates covered by the bucket, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> {
        let Bucket { x, y, width, height } = *self;
        (y..y + height).flat_map(move |py| (x..x + width).map(move |px| (px, py)))
    }
}

/// Cut a `width` x `height` frame into buckets, row-major from the top-left.
///
/// Edge buckets are clipped to the frame. A `bucket_size` of zero is treated
/// as one.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let size = bucket_size.max(1);
    (0..height)
        .step_by(size as usize)
        .flat_map(|y| {
            (0..width).step_by(size as usize).map(move |x| {
                Bucket::new(x, y, size.min(width - x), size.min(height - y))
            })
        })
        .collect()
}

/// Render every pixel of `bucket`, row-major within the bucket.
pub fn render_bucket(bucket: &Bucket, frame: &FrameSnapshot<'_>, config: &RenderConfig) -> Vec<Rgb> {
    bucket
        .pixels()
        .map(|(x, y)| render_pixel(frame, x, y, config))
        .collect()
}
