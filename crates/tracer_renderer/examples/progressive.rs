//! Progressive rendering example.
//!
//! Renders the random sphere scene for a few passes, moves the camera once
//! (which invalidates the accumulated samples), keeps refining and saves the
//! averaged result as a PNG.
//!
//! Usage: `cargo run --example progressive -- [config.json] [output.png]`

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracer_renderer::{
    color_to_rgba, resolve, Color, FrameCounter, Mat4, Material, MaterialId, RenderConfig,
    Raytracer, Sphere, Vec3,
};

const PASSES_BEFORE_MOVE: u32 = 4;
const PASSES_AFTER_MOVE: u32 = 16;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => load_config(&path)?,
        None => RenderConfig::default().with_quality(4, 5),
    };
    let output = args.next().unwrap_or_else(|| "progressive.png".to_string());

    let mut framebuffer = vec![Color::ZERO; config.pixel_count()];
    let mut frames = FrameCounter::new();
    let (width, height) = (config.width, config.height);

    let mut rt = Raytracer::new(config.clone(), &mut framebuffer)
        .context("Failed to create raytracer")?;
    build_scene(&mut rt, config.seed)?;

    let mut cam_pos = Vec3::new(0.0, 1.0, 10.0);
    rt.set_view_matrix(Mat4::from_translation(cam_pos))?;
    render_passes(&mut rt, &mut frames, PASSES_BEFORE_MOVE)?;

    // Step back and turn slightly; old samples no longer apply
    cam_pos += Vec3::new(0.0, 0.5, 2.0);
    let view = Mat4::from_translation(cam_pos) * Mat4::from_rotation_y(0.1);
    rt.set_view_matrix(view)?;
    rt.clear(&mut frames);
    render_passes(&mut rt, &mut frames, PASSES_AFTER_MOVE)?;
    drop(rt);

    save_png(&resolve(&framebuffer, &frames), width, height, &output)?;
    println!("Saved {} passes to {}", frames.get(), output);

    Ok(())
}

fn load_config(path: &str) -> Result<RenderConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse config {}", path))
}

fn render_passes(rt: &mut Raytracer<'_>, frames: &mut FrameCounter, passes: u32) -> Result<()> {
    for _ in 0..passes {
        let stats = rt.raytrace().context("Render pass failed")?;
        frames.advance();
        println!(
            "Pass {} ({} accumulated): {:.2?}",
            stats.frame,
            frames.get(),
            stats.elapsed
        );
    }
    Ok(())
}

/// Ground plus 12 random spheres of each material kind.
fn build_scene(rt: &mut Raytracer<'_>, seed: u64) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);

    let ground = rt.add_material(Material::lambertian(Color::splat(0.5), 0.3));
    rt.add_object(Sphere::new(Vec3::new(0.0, -1000.0, -1.0), 1000.0, ground))?;

    for _ in 0..12 {
        let color = Color::new(rng.gen(), rng.gen(), rng.gen());
        let mat = rt.add_material(Material::lambertian(color, rng.gen()));
        let sphere = random_sphere(&mut rng, 10.0, mat);
        rt.add_object(sphere)?;

        let color = Color::new(rng.gen(), rng.gen(), rng.gen());
        let mat = rt.add_material(Material::conductor(color, rng.gen()));
        let sphere = random_sphere(&mut rng, 30.0, mat);
        rt.add_object(sphere)?;

        let color = Color::new(rng.gen(), rng.gen(), rng.gen());
        let mat = rt.add_material(Material::dielectric(color, rng.gen(), 1.65));
        let sphere = random_sphere(&mut rng, 25.0, mat);
        rt.add_object(sphere)?;
    }

    Ok(())
}

fn random_sphere(rng: &mut StdRng, span: f32, material: MaterialId) -> Sphere {
    let radius = rng.gen::<f32>() * 0.7 + 0.2;
    let center = Vec3::new(
        rng.gen_range(-1.0..1.0) * span,
        rng.gen::<f32>() * span + 0.2,
        rng.gen_range(-1.0..1.0) * span,
    );
    Sphere::new(center, radius, material)
}

fn save_png(image: &[Color], width: u32, height: u32, path: &str) -> Result<()> {
    let mut img = image::RgbaImage::new(width, height);
    for (index, color) in image.iter().enumerate() {
        let x = index as u32 % width;
        // Row 0 of the buffer is the bottom of the picture
        let y = height - 1 - index as u32 / width;
        img.put_pixel(x, y, image::Rgba(color_to_rgba(*color)));
    }
    img.save(path).with_context(|| format!("Failed to save {}", path))
}
