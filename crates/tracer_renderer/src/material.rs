//! Materials and the scattering model.
//!
//! A material decides where a path goes after hitting a surface. The color
//! it attenuates the path by is applied by the integrator, not here.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracer_math::{Ray, Vec3};

use crate::sampling::{gen_f32, random_in_unit_sphere, random_unit_vector};

/// Color type alias (linear RGB, unclamped)
pub type Color = Vec3;

/// The closed set of scattering models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialKind {
    /// Diffuse surface under a thin coat; roughness 1 is purely diffuse
    Lambertian,
    /// Metal; roughness widens the mirror lobe
    Conductor,
    /// Glass-like; refracts or reflects by Fresnel probability
    Dielectric,
}

/// Surface description shared by every object that references it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub kind: MaterialKind,
    /// Base color, applied multiplicatively at every bounce
    pub color: Color,
    /// In [0, 1]
    pub roughness: f32,
    /// Only meaningful for [`MaterialKind::Dielectric`]
    pub refraction_index: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            kind: MaterialKind::Lambertian,
            color: Color::new(0.5, 0.5, 0.5),
            roughness: 0.75,
            refraction_index: 1.44,
        }
    }
}

impl Material {
    /// Create a diffuse material.
    pub fn lambertian(color: Color, roughness: f32) -> Self {
        Self {
            kind: MaterialKind::Lambertian,
            color,
            roughness: checked_roughness(roughness),
            ..Default::default()
        }
    }

    /// Create a metal.
    ///
    /// - `roughness`: 0.0 = perfect mirror, 1.0 = very rough
    pub fn conductor(color: Color, roughness: f32) -> Self {
        Self {
            kind: MaterialKind::Conductor,
            color,
            roughness: checked_roughness(roughness),
            ..Default::default()
        }
    }

    /// Create a dielectric.
    ///
    /// - `refraction_index`: 1.0 = air, 1.5 = glass, 2.4 = diamond
    pub fn dielectric(color: Color, roughness: f32, refraction_index: f32) -> Self {
        let refraction_index = if refraction_index > 0.0 {
            refraction_index
        } else {
            log::warn!(
                "Refraction index {} is not positive, clamping to {}",
                refraction_index,
                MIN_REFRACTION_INDEX
            );
            MIN_REFRACTION_INDEX
        };

        Self {
            kind: MaterialKind::Dielectric,
            color,
            roughness: checked_roughness(roughness),
            refraction_index,
        }
    }

    /// Roughness in [0, 1], whatever was stored in the field.
    fn unit_roughness(&self) -> f32 {
        clamp_roughness(self.roughness)
    }

    /// Scatter an incoming ray at `point`.
    ///
    /// `normal` is the outward unit normal of the surface; which side the
    /// ray arrives from is derived from it. The returned direction is
    /// normalized.
    pub fn scatter(&self, ray_in: &Ray, point: Vec3, normal: Vec3, rng: &mut dyn RngCore) -> Ray {
        let unit_direction = ray_in.direction().normalize();
        let front_face = unit_direction.dot(normal) < 0.0;
        // Normal always points against the ray
        let facing = if front_face { normal } else { -normal };

        let direction = match self.kind {
            MaterialKind::Lambertian => self.scatter_lambertian(unit_direction, facing, rng),
            MaterialKind::Conductor => self.scatter_conductor(unit_direction, facing, rng),
            MaterialKind::Dielectric => {
                self.scatter_dielectric(unit_direction, facing, front_face, rng)
            }
        };

        Ray::new(point, direction)
    }

    fn scatter_lambertian(&self, unit_direction: Vec3, facing: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        // A thin dielectric coat reflects a Fresnel share of the light. Rough
        // coats scatter that share into the diffuse lobe.
        let roughness = self.unit_roughness();
        let cos_theta = (-unit_direction).dot(facing).clamp(0.0, 1.0);
        let coat = schlick(cos_theta, LAMBERTIAN_COAT_F0) * (1.0 - roughness);
        if coat > gen_f32(rng) {
            return glossy_reflection(unit_direction, facing, roughness, rng);
        }

        // Cosine-weighted direction on the hemisphere around the normal
        let diffuse = facing + random_unit_vector(rng);

        // Catch degenerate scatter direction
        if diffuse.length_squared() < 1e-8 {
            facing
        } else {
            diffuse.normalize()
        }
    }

    fn scatter_conductor(&self, unit_direction: Vec3, facing: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        glossy_reflection(unit_direction, facing, self.unit_roughness(), rng)
    }

    fn scatter_dielectric(
        &self,
        unit_direction: Vec3,
        facing: Vec3,
        front_face: bool,
        rng: &mut dyn RngCore,
    ) -> Vec3 {
        // Materials built as data skip the constructor's checks
        let refraction_index = self.refraction_index.max(MIN_REFRACTION_INDEX);
        let refraction_ratio = if front_face {
            1.0 / refraction_index
        } else {
            refraction_index
        };

        let cos_theta = (-unit_direction).dot(facing).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

        // Check for total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction = if cannot_refract || reflectance(cos_theta, refraction_ratio) > gen_f32(rng) {
            reflect(unit_direction, facing)
        } else {
            refract(unit_direction, facing, refraction_ratio)
        };

        let roughness = self.unit_roughness();
        if roughness <= 0.0 {
            return direction.normalize();
        }

        let fuzzed = direction + roughness * random_in_unit_sphere(rng);
        if fuzzed.length_squared() < 1e-8 {
            direction.normalize()
        } else {
            fuzzed.normalize()
        }
    }
}

const MIN_REFRACTION_INDEX: f32 = 1e-3;

/// Normal-incidence reflectance of the coat on diffuse surfaces.
const LAMBERTIAN_COAT_F0: f32 = 0.04;

fn checked_roughness(roughness: f32) -> f32 {
    if !(0.0..=1.0).contains(&roughness) {
        log::warn!("Roughness {} outside [0, 1], clamping", roughness);
    }
    clamp_roughness(roughness)
}

fn clamp_roughness(roughness: f32) -> f32 {
    if roughness.is_nan() {
        return 0.0;
    }
    roughness.clamp(0.0, 1.0)
}

/// Mirror direction widened by `roughness`, never below the surface.
fn glossy_reflection(
    unit_direction: Vec3,
    facing: Vec3,
    roughness: f32,
    rng: &mut dyn RngCore,
) -> Vec3 {
    let reflected = reflect(unit_direction, facing);
    if roughness <= 0.0 {
        return reflected;
    }

    let fuzzed = reflected + roughness * random_in_unit_sphere(rng);
    if fuzzed.dot(facing) > 0.0 {
        fuzzed.normalize()
    } else {
        reflected
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface whose normal faces against it.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

/// Schlick's approximation for reflectance.
///
/// Matched indices have no interface and reflect nothing.
fn reflectance(cosine: f32, refraction_ratio: f32) -> f32 {
    if (refraction_ratio - 1.0).abs() < 1e-6 {
        return 0.0;
    }
    let r0 = ((1.0 - refraction_ratio) / (1.0 + refraction_ratio)).powi(2);
    schlick(cosine, r0)
}

#[inline]
fn schlick(cosine: f32, r0: f32) -> f32 {
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
