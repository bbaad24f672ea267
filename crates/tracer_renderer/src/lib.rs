//! Tracer - progressive CPU path tracing
//!
//! A Monte Carlo path tracer for scenes of spheres lit by a sky gradient.
//! Every [`Raytracer::raytrace`] pass adds one sample set per pixel into a
//! caller-owned accumulation buffer, which the caller averages over its
//! [`FrameCounter`] for display. Moving the camera invalidates the buffer;
//! call [`Raytracer::clear`] before the next pass.

mod buffer;
mod camera;
mod config;
mod error;
mod integrator;
mod material;
mod object;
mod raytracer;
mod sampling;
mod scene;
mod scheduler;
mod sphere;

pub use buffer::{as_f32_slice, color_to_rgba, linear_to_gamma, resolve, FrameCounter};
pub use camera::Camera;
pub use config::RenderConfig;
pub use error::{RenderError, Result};
pub use integrator::{sky_gradient, trace_path, SKY_BLUE};
pub use material::{reflect, refract, Color, Material, MaterialKind};
pub use object::{HitResult, MaterialId, Object, ObjectId, SurfaceHit};
pub use raytracer::{FrameStats, Raytracer};
pub use sampling::{Rng, SampleSeed};
pub use scene::{Scene, T_MIN};
pub use scheduler::{PassContext, WorkerOutput, WorkerPool};
pub use sphere::Sphere;

/// Re-export Vec3 and common math types from tracer_math
pub use tracer_math::{Interval, Mat4, Ray, Vec3};
