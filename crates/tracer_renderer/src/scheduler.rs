//! Parallel pixel scheduling.
//!
//! A persistent pool of worker threads shares one atomic pixel-claim
//! counter per pass. Every worker repeatedly claims the next pixel index,
//! samples it and stages the averaged color; the pass ends when the counter
//! runs past the last pixel and every worker has returned.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::{RenderError, Result};
use crate::integrator::trace_path;
use crate::sampling::{Rng, SampleSeed};
use crate::{Camera, Color, Scene};

/// Everything a pass reads. Immutable while workers run.
pub struct PassContext<'a> {
    pub scene: &'a Scene,
    pub camera: &'a Camera,
    pub width: u32,
    pub height: u32,
    pub rays_per_pixel: u32,
    pub max_bounces: u32,
    pub seed: u64,
    pub frame: u64,
}

impl PassContext<'_> {
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Average of `rays_per_pixel` jittered samples for one pixel.
    pub fn sample_pixel(&self, index: usize, rng: &mut Rng) -> Color {
        let x = (index % self.width as usize) as u32;
        let y = (index / self.width as usize) as u32;

        let mut pixel_color = Color::ZERO;
        for _ in 0..self.rays_per_pixel {
            let ray = self.camera.get_ray(x, y, self.width, self.height, rng);
            pixel_color += trace_path(self.scene, &ray, 0, self.max_bounces, rng);
        }

        // Average the samples
        pixel_color / self.rays_per_pixel as f32
    }
}

/// Samples produced by one worker during a pass.
#[derive(Debug, Default)]
pub struct WorkerOutput {
    /// Index of the worker in the pool
    pub worker: usize,
    /// `(pixel index, averaged color)` in claim order
    pub samples: Vec<(usize, Color)>,
}

/// A fixed-size pool of render workers, reused across passes.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// Create a pool of `workers` threads.
    pub fn new(workers: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("tracer-worker-{index}"))
            .build()?;
        Ok(Self { pool })
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run one pass over every pixel and block until all workers are done.
    ///
    /// Every pixel index in `[0, width * height)` is claimed by exactly one
    /// worker. A worker panic or a non-finite sample fails the whole pass.
    pub fn run_pass(&self, ctx: &PassContext<'_>) -> Result<Vec<WorkerOutput>> {
        let next_pixel = AtomicUsize::new(0);
        let failed = AtomicBool::new(false);

        let outputs = panic::catch_unwind(AssertUnwindSafe(|| {
            self.pool
                .broadcast(|worker| run_worker(worker.index(), ctx, &next_pixel, &failed))
        }))
        .map_err(|payload| RenderError::WorkerPanicked(panic_message(payload.as_ref())))?;

        outputs.into_iter().collect()
    }
}

fn run_worker(
    worker: usize,
    ctx: &PassContext<'_>,
    next_pixel: &AtomicUsize,
    failed: &AtomicBool,
) -> Result<WorkerOutput> {
    let pixel_count = ctx.pixel_count();
    let mut output = WorkerOutput {
        worker,
        samples: Vec::new(),
    };

    while !failed.load(Ordering::Relaxed) {
        let index = next_pixel.fetch_add(1, Ordering::Relaxed);
        if index >= pixel_count {
            break;
        }

        // Streams depend on the pixel, not on which worker claimed it
        let mut rng = SampleSeed {
            seed: ctx.seed,
            frame: ctx.frame,
            pixel: index,
        }
        .into_rng();

        let color = ctx.sample_pixel(index, &mut rng);
        if !color.is_finite() {
            failed.store(true, Ordering::Relaxed);
            return Err(RenderError::NonFiniteSample {
                x: (index % ctx.width as usize) as u32,
                y: (index / ctx.width as usize) as u32,
            });
        }
        output.samples.push((index, color));
    }

    Ok(output)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{MaterialId, Object, SurfaceHit};
    use crate::{Material, Sphere};
    use tracer_math::{Interval, Ray, Vec3};

    fn context<'a>(scene: &'a Scene, camera: &'a Camera, width: u32, height: u32) -> PassContext<'a> {
        PassContext {
            scene,
            camera,
            width,
            height,
            rays_per_pixel: 2,
            max_bounces: 3,
            seed: 99,
            frame: 0,
        }
    }

    #[test]
    fn test_every_pixel_claimed_exactly_once() {
        let mut scene = Scene::new();
        let mat = scene.add_material(Material::default());
        scene
            .add_object(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, mat))
            .unwrap();
        let camera = Camera::default();

        for workers in [1, 3, 8] {
            let pool = WorkerPool::new(workers).unwrap();
            assert_eq!(pool.workers(), workers);

            let ctx = context(&scene, &camera, 37, 23);
            let outputs = pool.run_pass(&ctx).unwrap();
            assert_eq!(outputs.len(), workers);

            let mut claimed: Vec<usize> = outputs
                .iter()
                .flat_map(|output| output.samples.iter().map(|(index, _)| *index))
                .collect();
            claimed.sort_unstable();

            // No duplicate and no gap
            let expected: Vec<usize> = (0..ctx.pixel_count()).collect();
            assert_eq!(claimed, expected);
        }
    }

    #[test]
    fn test_worker_outputs_are_indexed() {
        let scene = Scene::new();
        let camera = Camera::default();
        let pool = WorkerPool::new(4).unwrap();

        let outputs = pool.run_pass(&context(&scene, &camera, 8, 8)).unwrap();
        let mut workers: Vec<usize> = outputs.iter().map(|output| output.worker).collect();
        workers.sort_unstable();
        assert_eq!(workers, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_pixel_stream_is_independent_of_worker() {
        let mut scene = Scene::new();
        let mat = scene.add_material(Material::lambertian(Vec3::splat(0.7), 1.0));
        scene
            .add_object(Sphere::new(Vec3::new(0.0, 0.0, -2.0), 1.5, mat))
            .unwrap();
        let camera = Camera::default();
        let ctx = context(&scene, &camera, 5, 5);

        let sample = |pixel| {
            let mut rng = SampleSeed { seed: ctx.seed, frame: ctx.frame, pixel }.into_rng();
            ctx.sample_pixel(pixel, &mut rng)
        };
        assert_eq!(sample(12), sample(12));
    }

    struct PanickingObject;

    impl Object for PanickingObject {
        fn intersect(&self, _ray: &Ray, _ray_t: Interval) -> Option<SurfaceHit> {
            panic!("intersection blew up");
        }

        fn material(&self) -> MaterialId {
            MaterialId(0)
        }
    }

    #[test]
    fn test_worker_panic_fails_the_pass() {
        let mut scene = Scene::new();
        scene.add_material(Material::default());
        scene.add_object(PanickingObject).unwrap();
        let camera = Camera::default();
        let pool = WorkerPool::new(2).unwrap();

        let err = pool.run_pass(&context(&scene, &camera, 4, 4)).unwrap_err();
        match err {
            RenderError::WorkerPanicked(message) => {
                assert!(message.contains("intersection blew up"))
            }
            other => panic!("unexpected error: {other}"),
        }

        // The pool survives a failed pass
        let scene = Scene::new();
        assert!(pool.run_pass(&context(&scene, &camera, 4, 4)).is_ok());
    }

    struct NanObject;

    impl Object for NanObject {
        fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit> {
            // Poisons the first bounce, which then escapes to the sky
            if !ray.direction().is_finite() {
                return None;
            }
            Some(SurfaceHit {
                t: ray_t.min + 1.0,
                point: Vec3::ZERO,
                normal: Vec3::NAN,
            })
        }

        fn material(&self) -> MaterialId {
            MaterialId(0)
        }
    }

    #[test]
    fn test_non_finite_sample_fails_the_pass() {
        let mut scene = Scene::new();
        scene.add_material(Material::default());
        scene.add_object(NanObject).unwrap();
        let camera = Camera::default();
        let pool = WorkerPool::new(2).unwrap();

        let err = pool.run_pass(&context(&scene, &camera, 4, 4)).unwrap_err();
        assert!(matches!(err, RenderError::NonFiniteSample { .. }));
    }
}
