//! Progressive rendering engine.
//!
//! [`Raytracer`] ties the scene, the camera and the worker pool to a
//! caller-owned accumulation buffer. Each call to [`Raytracer::raytrace`]
//! adds one averaged sample set per pixel into that buffer; the caller keeps
//! a [`FrameCounter`] to turn the running sum into an image.

use std::time::{Duration, Instant};

use rand::RngCore;
use tracer_math::{Mat4, Ray};

use crate::buffer::FrameCounter;
use crate::error::{RenderError, Result};
use crate::integrator;
use crate::object::{HitResult, MaterialId, Object, ObjectId};
use crate::scheduler::{PassContext, WorkerPool};
use crate::{Camera, Color, Material, RenderConfig, Scene};

/// Summary of one completed pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    /// Index of the pass since the engine was created
    pub frame: u64,
    /// Pixels written
    pub pixels: usize,
    /// Camera samples traced
    pub samples: usize,
    /// Pixels claimed by each worker, indexed by worker
    pub claims_per_worker: Vec<usize>,
    /// Wall time of the pass
    pub elapsed: Duration,
}

/// Progressive path tracer writing into a borrowed accumulation buffer.
///
/// Scene mutation and camera changes take `&mut self`, so they can never
/// overlap a running pass.
pub struct Raytracer<'fb> {
    config: RenderConfig,
    frame_buffer: &'fb mut [Color],
    scene: Scene,
    camera: Camera,
    pool: WorkerPool,
    frame: u64,
}

impl<'fb> Raytracer<'fb> {
    /// Create an engine rendering into `frame_buffer`.
    ///
    /// The buffer must hold exactly `width * height` cells, row-major with
    /// row 0 at the bottom of the image. Its contents are kept as they are.
    pub fn new(config: RenderConfig, frame_buffer: &'fb mut [Color]) -> Result<Self> {
        config.validate()?;

        let expected = config.pixel_count();
        if frame_buffer.len() != expected {
            return Err(RenderError::BufferSize {
                expected,
                actual: frame_buffer.len(),
            });
        }

        let pool = WorkerPool::new(config.worker_count())?;

        log::info!(
            "Raytracer: {}x{}, {} rays/pixel, {} max bounces, {} workers",
            config.width,
            config.height,
            config.rays_per_pixel,
            config.max_bounces,
            pool.workers()
        );

        Ok(Self {
            config,
            frame_buffer,
            scene: Scene::new(),
            camera: Camera::default(),
            pool,
            frame: 0,
        })
    }

    /// Add a material to the scene.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.scene.add_material(material)
    }

    /// Add an object to the scene. Its material must already be added.
    pub fn add_object<O: Object + 'static>(&mut self, object: O) -> Result<ObjectId> {
        self.scene.add_object(object)
    }

    /// Move the camera.
    ///
    /// Samples already in the buffer belong to the old pose; call
    /// [`Raytracer::clear`] before the next pass.
    pub fn set_view_matrix(&mut self, view: Mat4) -> Result<()> {
        self.camera = Camera::from_view(view)?;
        log::debug!("View matrix set, eye at {}", self.camera.position());
        Ok(())
    }

    /// Zero the accumulation buffer and reset the caller's frame count.
    pub fn clear(&mut self, frames: &mut FrameCounter) {
        self.frame_buffer.fill(Color::ZERO);
        frames.reset();
        log::debug!("Cleared {} cells", self.frame_buffer.len());
    }

    /// Run one full accumulation pass over every pixel.
    ///
    /// Blocks until every worker has finished. On error nothing is added to
    /// the buffer.
    pub fn raytrace(&mut self) -> Result<FrameStats> {
        let start = Instant::now();
        let ctx = PassContext {
            scene: &self.scene,
            camera: &self.camera,
            width: self.config.width,
            height: self.config.height,
            rays_per_pixel: self.config.rays_per_pixel,
            max_bounces: self.config.max_bounces,
            seed: self.config.seed,
            frame: self.frame,
        };

        let outputs = match self.pool.run_pass(&ctx) {
            Ok(outputs) => outputs,
            Err(err) => {
                log::error!("Pass {} failed: {}", self.frame, err);
                return Err(err);
            }
        };

        // Every pixel was claimed once, so each cell gets exactly one sum
        let mut claims_per_worker = vec![0; self.pool.workers()];
        for output in outputs {
            if let Some(claims) = claims_per_worker.get_mut(output.worker) {
                *claims = output.samples.len();
            }
            for (index, color) in output.samples {
                self.frame_buffer[index] += color;
            }
        }

        let pixels = self.config.pixel_count();
        let stats = FrameStats {
            frame: self.frame,
            pixels,
            samples: pixels * self.config.rays_per_pixel as usize,
            claims_per_worker,
            elapsed: start.elapsed(),
        };

        log::debug!(
            "Pass {}: {} pixels, {} samples in {:.2?}, claims per worker {:?}",
            stats.frame,
            stats.pixels,
            stats.samples,
            stats.elapsed,
            stats.claims_per_worker
        );

        self.frame += 1;
        Ok(stats)
    }

    /// Radiance along `ray`, starting at bounce `depth`.
    pub fn trace_path(&self, ray: &Ray, depth: u32, rng: &mut dyn RngCore) -> Color {
        integrator::trace_path(&self.scene, ray, depth, self.config.max_bounces, rng)
    }

    /// Nearest hit of `ray` in the scene.
    pub fn raycast(&self, ray: &Ray) -> Option<HitResult<'_>> {
        self.scene.raycast(ray)
    }

    /// The accumulation buffer.
    pub fn frame_buffer(&self) -> &[Color] {
        self.frame_buffer
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Number of passes completed since construction.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}
