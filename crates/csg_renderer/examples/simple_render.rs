//! Simple sphere-tracing example.
//!
//! Renders a small CSG scene and saves it as a PNG.
//!
//! Run with:
//!   cargo run --example simple_render
//!   cargo run --example simple_render -- demos/cup.json [render_config.json] [out.png]

use std::env;
use std::time::Instant;

use anyhow::{Context, Result};
use csg_core::{CsgOp, LightColor, Scene};
use csg_math::RotationPlane;
use csg_renderer::{render, RenderConfig, Vec3};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();

    let scene = match args.get(1) {
        Some(path) => Scene::load_json(path).with_context(|| format!("loading scene {}", path))?,
        None => build_scene()?,
    };

    let config = match args.get(2) {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading render config {}", path))?;
            RenderConfig::from_json_str(&json)?
        }
        None => RenderConfig::default(),
    };

    let start = Instant::now();
    let image = render(&scene, &config);
    println!("Rendered {}x{} in {:?}", image.width, image.height, start.elapsed());

    let filename = args.get(3).map(String::as_str).unwrap_or("output.png");
    image
        .to_image()
        .save(filename)
        .with_context(|| format!("saving {}", filename))?;
    println!("Saved to {}", filename);

    Ok(())
}

/// A box with a spherical bite taken out, tilted, next to a capsule-ish
/// union of a cylinder and a sphere.
fn build_scene() -> Result<Scene> {
    let mut scene = Scene::new().with_resolution(320, 240);

    let cuboid = scene.add_box(1.5, 1.5, 1.5);
    let bite = scene.add_sphere(1.0);
    scene.translate_object(&bite, Vec3::new(0.6, -0.6, -0.6))?;
    let bitten = scene.combine(CsgOp::Difference, &cuboid, &bite)?;
    scene.rotate_object(&bitten, 25.0, RotationPlane::Xz)?;
    scene.translate_object(&bitten, Vec3::new(-1.3, 0.0, 0.0))?;

    let shaft = scene.add_cylinder(0.4, 1.6);
    scene.rotate_object(&shaft, 90.0, RotationPlane::Yz)?;
    let cap = scene.add_sphere(0.55);
    scene.translate_object(&cap, Vec3::new(0.0, -0.8, 0.0))?;
    let pin = scene.combine(CsgOp::Union, &shaft, &cap)?;
    scene.translate_object(&pin, Vec3::new(1.4, 0.0, 0.0))?;

    scene.add_light(Vec3::new(-6.0, 4.0, -6.0), LightColor::Blue);
    Ok(scene)
}
