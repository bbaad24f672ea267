//! Path integrator.
//!
//! Estimates the radiance arriving along a ray by following a single
//! bounce chain through the scene, with the sky as the only light.

use rand::RngCore;
use tracer_math::{Ray, Vec3};

use crate::{Color, Scene};

/// Sky color at the horizon end of the gradient.
pub const SKY_BLUE: Color = Color::new(0.5, 0.7, 1.0);

/// Compute the color seen by a ray.
///
/// Follows the path from `depth` on. A miss at any depth returns the sky,
/// attenuated by the colors of every surface hit on the way. A hit once
/// `depth` has reached `max_bounces` ends the path with black and does not
/// scatter.
pub fn trace_path(
    scene: &Scene,
    ray: &Ray,
    depth: u32,
    max_bounces: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let mut ray = *ray;
    let mut depth = depth;
    let mut attenuation = Color::ONE;

    loop {
        let Some(hit) = scene.raycast(&ray) else {
            return attenuation * sky_gradient(ray.direction());
        };

        // Bounded paths do not leak background light at the cutoff
        if depth >= max_bounces {
            return Color::ZERO;
        }

        ray = hit.material.scatter(&ray, hit.point, hit.normal, rng);
        attenuation *= hit.color();
        depth += 1;
    }
}

/// Compute sky gradient background.
///
/// Linear blend from white at `direction.y = -1` to [`SKY_BLUE`] at
/// `direction.y = 1`.
pub fn sky_gradient(direction: Vec3) -> Color {
    let unit_direction = direction.normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    white * (1.0 - a) + SKY_BLUE * a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::Rng;
    use crate::{Material, Sphere};
    use rand::SeedableRng;

    fn assert_close(a: Color, b: Color, tolerance: f32) {
        assert!(
            (a - b).abs().max_element() <= tolerance,
            "{:?} != {:?} (tolerance {})",
            a,
            b,
            tolerance
        );
    }

    #[test]
    fn test_sky_gradient_endpoints() {
        assert_eq!(sky_gradient(Vec3::new(0.0, -1.0, 0.0)), Color::ONE);
        assert_eq!(sky_gradient(Vec3::new(0.0, 1.0, 0.0)), SKY_BLUE);
        assert_close(
            sky_gradient(Vec3::new(1.0, 0.0, 0.0)),
            Color::new(0.75, 0.85, 1.0),
            1e-6,
        );
    }

    #[test]
    fn test_sky_gradient_normalizes_direction() {
        assert_eq!(
            sky_gradient(Vec3::new(0.0, 4.0, 0.0)),
            sky_gradient(Vec3::new(0.0, 1.0, 0.0))
        );
    }

    #[test]
    fn test_empty_scene_returns_sky() {
        let scene = Scene::new();
        let mut rng = Rng::seed_from_u64(1);

        for y in [-1.0, 0.0, 1.0] {
            let direction = Vec3::new(0.0, y, if y == 0.0 { -1.0 } else { 0.0 });
            let ray = Ray::new(Vec3::ZERO, direction);
            let t = 0.5 * (y + 1.0);
            let expected = Color::ONE * (1.0 - t) + SKY_BLUE * t;

            assert_eq!(trace_path(&scene, &ray, 0, 5, &mut rng), expected);
        }
    }

    #[test]
    fn test_zero_bounces_never_scatters() {
        let mut scene = Scene::new();
        let mat = scene.add_material(Material::lambertian(Color::new(0.9, 0.1, 0.1), 1.0));
        scene
            .add_object(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, mat))
            .unwrap();

        let mut rng = Rng::seed_from_u64(5);
        let untouched = rng.clone();

        let hit = trace_path(&scene, &Ray::new(Vec3::ZERO, Vec3::NEG_Z), 0, 0, &mut rng);
        let miss = trace_path(&scene, &Ray::new(Vec3::ZERO, Vec3::Y), 0, 0, &mut rng);

        assert_eq!(hit, Color::ZERO);
        assert_eq!(miss, SKY_BLUE);
        // The scatterer is the only consumer of randomness
        assert_eq!(rng, untouched);
    }

    #[test]
    fn test_depth_cutoff_returns_black() {
        let mut scene = Scene::new();
        let mat = scene.add_material(Material::conductor(Color::ONE, 0.0));
        // Camera sits inside a mirror sphere: every bounce hits again
        scene.add_object(Sphere::new(Vec3::ZERO, 10.0, mat)).unwrap();

        let mut rng = Rng::seed_from_u64(6);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.3, 0.2, -1.0));
        assert_eq!(trace_path(&scene, &ray, 0, 8, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_starting_depth_counts_towards_limit() {
        let mut scene = Scene::new();
        let mat = scene.add_material(Material::conductor(Color::splat(0.5), 0.0));
        scene
            .add_object(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, mat))
            .unwrap();

        let mut rng = Rng::seed_from_u64(7);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        // Mirror sends the ray straight back out to the sky
        let bounced = trace_path(&scene, &ray, 0, 1, &mut rng);
        assert_close(bounced, 0.5 * sky_gradient(Vec3::Z), 1e-5);

        let cut = trace_path(&scene, &ray, 1, 1, &mut rng);
        assert_eq!(cut, Color::ZERO);
    }

    #[test]
    fn test_diffuse_sphere_converges_to_analytic_radiance() {
        // One bounce off a fully diffuse convex sphere always escapes to the
        // sky. The sky is linear in direction.y and a cosine-weighted lobe
        // around n has mean direction.y = 2/3 * n.y.
        let albedo = Color::new(0.8, 0.6, 0.4);
        let mut scene = Scene::new();
        let mat = scene.add_material(Material::lambertian(albedo, 1.0));
        scene
            .add_object(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, mat))
            .unwrap();

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.5, -3.0));
        let hit = scene.raycast(&ray).unwrap();
        let mean_y = 2.0 / 3.0 * hit.normal.y;
        let t = 0.5 * (mean_y + 1.0);
        let expected = albedo * (Color::ONE * (1.0 - t) + SKY_BLUE * t);

        let mut rng = Rng::seed_from_u64(8);
        let frames = 20_000;
        let mut sum = Color::ZERO;
        for _ in 0..frames {
            sum += trace_path(&scene, &ray, 0, 1, &mut rng);
        }

        assert_close(sum / frames as f32, expected, 0.01);
    }
}
