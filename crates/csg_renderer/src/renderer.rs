//! Frame renderer.
//!
//! Every pixel is independent: its camera ray is marched against a read-only
//! snapshot of the scene, shaded on a hit and left black on a miss. Buckets
//! of pixels are spread across threads with rayon and assembled at the end.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use csg_core::{Light, Scene, SceneField};
use csg_math::Ray;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bucket::{generate_buckets, render_bucket, Bucket, DEFAULT_BUCKET_SIZE};
use crate::camera::{CameraRays, DEFAULT_FOV};
use crate::march::{march, MarchConfig, MarchOutcome};
use crate::shade::{color_to_rgb, estimate_normal, shade, Color, Rgb, ShadingConfig};
use crate::{RenderError, RenderResult};

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub march: MarchConfig,
    pub shading: ShadingConfig,
    /// Field of view in radians
    pub fov: f32,
    /// Edge length of the square tiles handed to worker threads
    pub bucket_size: u32,
    /// Skip objects whose bounding spheres miss each pixel's ray
    pub bounding_sphere_culling: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            march: MarchConfig::default(),
            shading: ShadingConfig::default(),
            fov: DEFAULT_FOV,
            bucket_size: DEFAULT_BUCKET_SIZE,
            bounding_sphere_culling: false,
        }
    }
}

impl RenderConfig {
    /// Parse a (possibly partial) JSON configuration; missing knobs keep
    /// their defaults.
    pub fn from_json_str(json: &str) -> RenderResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Read-only view of everything one render pass needs.
///
/// Borrowing the scene for the lifetime of the snapshot keeps it from being
/// edited while a pass is in flight.
pub struct FrameSnapshot<'a> {
    field: SceneField<'a>,
    lights: Vec<&'a Light>,
    rays: CameraRays,
}

impl<'a> FrameSnapshot<'a> {
    pub fn new(scene: &'a Scene, config: &RenderConfig) -> Self {
        Self {
            field: scene.field(),
            lights: scene.lights().map(|(_, light)| light).collect(),
            rays: CameraRays::new(&scene.camera, scene.width, scene.height, config.fov),
        }
    }

    pub fn width(&self) -> u32 {
        self.rays.width()
    }

    pub fn height(&self) -> u32 {
        self.rays.height()
    }

    pub fn field(&self) -> &SceneField<'a> {
        &self.field
    }

    pub fn lights(&self) -> &[&'a Light] {
        &self.lights
    }

    pub fn rays(&self) -> &CameraRays {
        &self.rays
    }
}

/// Compute the color seen along a ray: shaded on a hit, black otherwise.
pub fn trace_ray(field: &SceneField<'_>, ray: &Ray, lights: &[&Light], config: &RenderConfig) -> Color {
    let culled;
    let field = if config.bounding_sphere_culling {
        culled = field.culled_for(ray);
        &culled
    } else {
        field
    };

    match march(field, ray, &config.march) {
        MarchOutcome::Hit(hit) => {
            let normal = estimate_normal(field, hit.point, config.shading.epsilon);
            shade(normal, hit.point, lights.iter().copied(), &config.shading)
        }
        MarchOutcome::Miss(_) => Color::ZERO,
    }
}

/// Render a single pixel.
pub fn render_pixel(frame: &FrameSnapshot<'_>, x: u32, y: u32, config: &RenderConfig) -> Rgb {
    let ray = frame.rays.ray(x, y);
    color_to_rgb(trace_ray(&frame.field, &ray, &frame.lights, config))
}

/// Rendered frame: 8-bit RGB pixels in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgb>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0]; width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Rgb {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, rgb: Rgb) {
        let index = self.index(x, y);
        self.pixels[index] = rgb;
    }

    /// Copy a rendered bucket into place. `pixels` is row-major within the
    /// bucket, as [`render_bucket`] produces it.
    pub fn write_bucket(&mut self, bucket: &Bucket, pixels: &[Rgb]) {
        for ((x, y), rgb) in bucket.pixels().zip(pixels) {
            self.set(x, y, *rgb);
        }
    }

    /// Flatten to packed RGB bytes.
    pub fn as_rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }

    /// Convert to an `image` buffer for saving or display.
    pub fn to_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width, self.height, |x, y| image::Rgb(self.get(x, y)))
    }
}

/// Render the scene to an image buffer, in parallel across buckets.
pub fn render(scene: &Scene, config: &RenderConfig) -> ImageBuffer {
    match render_frame(scene, config, None) {
        Ok(image) => image,
        // Only reachable with a cancel flag
        Err(_) => ImageBuffer::new(scene.width, scene.height),
    }
}

/// Like [`render`], but checks `cancel` before starting each bucket.
///
/// Buckets already in flight finish; if any bucket was skipped the whole
/// frame is discarded.
pub fn render_cancellable(
    scene: &Scene,
    config: &RenderConfig,
    cancel: &AtomicBool,
) -> RenderResult<ImageBuffer> {
    render_frame(scene, config, Some(cancel))
}

fn render_frame(
    scene: &Scene,
    config: &RenderConfig,
    cancel: Option<&AtomicBool>,
) -> RenderResult<ImageBuffer> {
    let start = Instant::now();
    let frame = FrameSnapshot::new(scene, config);
    let buckets = generate_buckets(frame.width(), frame.height(), config.bucket_size);
    let total = buckets.len();
    log::info!(
        "Rendering {}x{} ({} objects, {} lights) in {} buckets",
        frame.width(),
        frame.height(),
        frame.field.len(),
        frame.lights.len(),
        total
    );

    let results: Vec<Option<(Bucket, Vec<Rgb>)>> = buckets
        .par_iter()
        .map(|bucket| {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return None;
            }
            let pixels = render_bucket(bucket, &frame, config);
            log::trace!("Bucket at ({}, {}) done", bucket.x, bucket.y);
            Some((*bucket, pixels))
        })
        .collect();

    let completed = results.iter().flatten().count();
    if completed < total {
        log::warn!("Render cancelled after {} of {} buckets", completed, total);
        return Err(RenderError::Cancelled { completed, total });
    }

    let mut image = ImageBuffer::new(frame.width(), frame.height());
    for (bucket, pixels) in results.iter().flatten() {
        image.write_bucket(bucket, pixels);
    }

    log::info!("Rendered in {:?}", start.elapsed());
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use csg_core::{CsgNode, LightColor, Primitive};
    use csg_math::Vec3;

    /// Unit sphere at the origin, camera at (0, 0, -5), one light.
    fn sphere_scene(size: u32, light: Vec3, color: LightColor) -> Scene {
        let mut scene = Scene::empty().with_resolution(size, size);
        scene.add_sphere(1.0);
        scene.add_light(light, color);
        scene
    }

    fn small_config() -> RenderConfig {
        RenderConfig {
            bucket_size: 8,
            ..Default::default()
        }
    }

    fn brightness(rgb: Rgb) -> u32 {
        rgb.iter().map(|&c| c as u32).sum()
    }

    #[test]
    fn test_render_pixel_hit_and_miss() {
        let scene = sphere_scene(32, Vec3::new(0.0, 0.0, -5.0), LightColor::White);
        let config = RenderConfig::default();
        let frame = FrameSnapshot::new(&scene, &config);

        // Head-on, lit from the camera: fully saturated
        assert_eq!(render_pixel(&frame, 16, 16, &config), [255, 255, 255]);
        // Corner ray misses everything
        assert_eq!(render_pixel(&frame, 0, 0, &config), [0, 0, 0]);
    }

    #[test]
    fn test_center_brighter_than_silhouette() {
        let size = 64;
        let scene = sphere_scene(size, Vec3::new(0.0, 0.0, -5.0), LightColor::White);
        let image = render(&scene, &small_config());

        let row = size / 2;
        let center = image.get(size / 2, row);
        let edge_x = (size / 2..size)
            .rev()
            .find(|&x| image.get(x, row) != [0, 0, 0])
            .expect("sphere covers part of the middle row");
        assert!(edge_x > size / 2);

        let edge = image.get(edge_x, row);
        assert!(brightness(center) > brightness(edge), "{center:?} vs {edge:?}");
    }

    #[test]
    fn test_light_color_selects_channels() {
        let scene = sphere_scene(16, Vec3::new(0.0, 0.0, -5.0), LightColor::Red);
        let config = RenderConfig::default();
        let frame = FrameSnapshot::new(&scene, &config);
        let rgb = render_pixel(&frame, 8, 8, &config);
        assert_eq!(rgb, [255, 0, 0]);
    }

    #[test]
    fn test_lights_accumulate_per_channel() {
        let mut scene = sphere_scene(16, Vec3::new(0.0, 0.0, -5.0), LightColor::Red);
        // Behind the sphere: contributes ambient only
        scene.add_light(Vec3::new(0.0, 0.0, 10.0), LightColor::Blue);
        let config = RenderConfig::default();
        let frame = FrameSnapshot::new(&scene, &config);

        let [r, g, b] = render_pixel(&frame, 8, 8, &config);
        assert_eq!((r, g), (255, 0));
        assert_eq!(b, (0.1_f32 * 255.0) as u8);
    }

    #[test]
    fn test_parallel_matches_per_pixel() {
        let mut scene = Scene::empty().with_resolution(40, 30);
        let cuboid = scene.add_box(1.5, 1.0, 1.0);
        scene.rotate_object(&cuboid, 30.0, csg_math::RotationPlane::Xy).expect("rotate");
        let ball = scene.add_sphere(0.8);
        scene.translate_object(&ball, Vec3::new(0.6, 0.3, -0.2)).expect("translate");
        scene.combine(csg_core::CsgOp::Difference, &cuboid, &ball).expect("combine");
        scene.add_light(Vec3::new(3.0, -4.0, -6.0), LightColor::Green);

        let config = RenderConfig {
            bucket_size: 7,
            ..Default::default()
        };
        let image = render(&scene, &config);
        let frame = FrameSnapshot::new(&scene, &config);

        for y in 0..scene.height {
            for x in 0..scene.width {
                assert_eq!(image.get(x, y), render_pixel(&frame, x, y, &config), "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_empty_scene_is_black() {
        let mut scene = Scene::new().with_resolution(12, 9);
        let image = render(&scene, &small_config());
        assert_eq!(image.pixels.len(), 12 * 9);
        assert!(image.pixels.iter().all(|p| *p == [0, 0, 0]));

        // Lights alone do not light anything either
        scene.add_light(Vec3::ZERO, LightColor::White);
        assert_eq!(render(&scene, &small_config()), image);
    }

    #[test]
    fn test_camera_inside_object_renders_black() {
        // Known limitation: inside geometry every ray is a miss
        let mut scene = Scene::new().with_resolution(8, 8);
        scene.insert_object("room", CsgNode::leaf(Primitive::sphere(20.0))).expect("insert");
        let image = render(&scene, &small_config());
        assert!(image.pixels.iter().all(|p| *p == [0, 0, 0]));
    }

    #[test]
    fn test_culling_keeps_coverage_for_separate_objects() {
        let mut scene = Scene::new().with_resolution(48, 32);
        let left = scene.add_sphere(0.7);
        scene.translate_object(&left, Vec3::new(-1.5, 0.0, 0.0)).expect("translate");
        let right = scene.add_cylinder(0.5, 1.5);
        scene.translate_object(&right, Vec3::new(1.5, 0.0, 0.0)).expect("translate");

        let plain = render(&scene, &small_config());
        let culled = render(
            &scene,
            &RenderConfig {
                bounding_sphere_culling: true,
                ..small_config()
            },
        );
        let lit = plain.pixels.iter().filter(|p| **p != [0, 0, 0]).count();
        assert!(lit > 0);
        let lit_culled = culled.pixels.iter().filter(|p| **p != [0, 0, 0]).count();
        // Step sequences differ, so a grazing silhouette pixel may flip
        assert!(lit.abs_diff(lit_culled) <= 3, "{lit} vs {lit_culled}");
    }

    #[test]
    fn test_cancelled_render() {
        let scene = sphere_scene(32, Vec3::new(0.0, 0.0, -5.0), LightColor::White);
        let config = small_config();

        let cancel = AtomicBool::new(true);
        match render_cancellable(&scene, &config, &cancel) {
            Err(RenderError::Cancelled { completed, total }) => {
                assert_eq!(completed, 0);
                assert_eq!(total, 16);
            }
            other => panic!("expected cancellation, got {other:?}"),
        }

        let cancel = AtomicBool::new(false);
        let image = render_cancellable(&scene, &config, &cancel).expect("not cancelled");
        assert_eq!(image, render(&scene, &config));
    }

    #[test]
    fn test_render_config_json() {
        let config = RenderConfig::from_json_str(
            r#"{ "march": { "precision": 0.0001 }, "bounding_sphere_culling": true }"#,
        )
        .expect("partial config");
        assert_eq!(config.march.precision, 0.0001);
        assert_eq!(config.march.iteration_limit, 100);
        assert_eq!(config.shading, ShadingConfig::default());
        assert!(config.bounding_sphere_culling);
        assert_eq!(config.fov, DEFAULT_FOV);

        assert!(matches!(
            RenderConfig::from_json_str("{ \"fov\": \"wide\" }"),
            Err(RenderError::Config(_))
        ));
    }

    #[test]
    fn test_image_buffer_conversions() {
        let mut image = ImageBuffer::new(3, 2);
        image.set(2, 1, [10, 20, 30]);
        assert_eq!(image.get(2, 1), [10, 20, 30]);

        let bytes = image.as_rgb_bytes();
        assert_eq!(bytes.len(), 3 * 2 * 3);
        assert_eq!(&bytes[15..18], &[10, 20, 30]);

        let rgb = image.to_image();
        assert_eq!(rgb.dimensions(), (3, 2));
        assert_eq!(rgb.get_pixel(2, 1).0, [10, 20, 30]);
    }

    #[test]
    fn test_pixel_index_past_u32_range() {
        let image = ImageBuffer {
            width: 70_000,
            height: 70_000,
            pixels: Vec::new(),
        };
        assert_eq!(image.index(1, 69_999), 69_999 * 70_000 + 1);
        assert!(image.index(1, 69_999) > u32::MAX as usize);
    }

    #[test]
    fn test_write_bucket_places_pixels() {
        let mut image = ImageBuffer::new(4, 4);
        let bucket = Bucket::new(2, 1, 2, 2);
        image.write_bucket(&bucket, &[[1, 0, 0], [2, 0, 0], [3, 0, 0], [4, 0, 0]]);

        assert_eq!(image.get(2, 1), [1, 0, 0]);
        assert_eq!(image.get(3, 1), [2, 0, 0]);
        assert_eq!(image.get(2, 2), [3, 0, 0]);
        assert_eq!(image.get(3, 2), [4, 0, 0]);
        assert_eq!(image.get(1, 1), [0, 0, 0]);
    }
}
