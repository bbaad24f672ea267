//! Random number streams and sampling helpers.

use std::hash::{DefaultHasher, Hash, Hasher};

use rand::{Rng as _, RngCore, SeedableRng};
use tracer_math::Vec3;

/// Generator owned by each render worker.
pub type Rng = rand_xoshiro::Xoshiro256PlusPlus;

/// Identifies the sample stream of one pixel in one pass.
///
/// Hashing the full tuple keeps streams uncorrelated across pixels, frames
/// and sessions, and makes the stream of a pixel independent of which
/// worker claims it.
#[derive(Debug, Clone, Copy, Hash)]
pub struct SampleSeed {
    pub seed: u64,
    pub frame: u64,
    pub pixel: usize,
}

impl SampleSeed {
    pub fn into_rng(self) -> Rng {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        Rng::seed_from_u64(hasher.finish())
    }
}

/// Uniform f32 in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Generate a random unit vector on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    // Use rejection sampling for uniform distribution on sphere
    loop {
        let v = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-6 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Generate a random point inside the unit ball.
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let v = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        if v.length_squared() < 1.0 {
            return v;
        }
    }
}
