// Copyright @yucwang 2026

use crate::core::rng::LcgRng;
use crate::core::sampler::PrimarySampler;
use crate::core::scene::{Reflectance, Scene};
use crate::math::constants::{Float, Vector3f, EPSILON, INF, INV_PI, PI};
use crate::math::ray::Ray3f;
use crate::math::spectrum::{self, Color};

// Recursion depth after which Russian roulette starts pruning paths.
const MAX_DEPTH: u32 = 5;
// Beyond this depth only one side of a Fresnel split is followed.
const SPLIT_DEPTH: u32 = 2;
// Shadow rays accept the light if the occluder distance matches this closely.
const SHADOW_TOLERANCE: Float = 1e-3;
const VACUUM_IOR: Float = 1.0;
const GLASS_IOR: Float = 1.5;

fn reflect(dir: &Vector3f, normal: &Vector3f) -> Vector3f {
    *dir - *normal * (2.0 * normal.dot(dir))
}

// Emission carried by a deterministic ray, i.e. the light seen in a mirror.
fn direct_light_along(scene: &Scene, ray: &Ray3f) -> Color {
    match scene.intersect(ray) {
        Some(hit) if hit.id == scene.light_id() => *scene.light().emission(),
        _ => spectrum::black(),
    }
}

fn orthonormal_basis(w: &Vector3f) -> (Vector3f, Vector3f) {
    let u = if w.x.abs() > 0.1 {
        Vector3f::new(0.0, 1.0, 0.0).cross(w).normalize()
    } else {
        Vector3f::new(1.0, 0.0, 0.0).cross(w).normalize()
    };
    let v = w.cross(&u);
    (u, v)
}

// Next-event estimation against the single spherical emitter. Samples a
// point on the light uniformly by area, then checks visibility by comparing
// the shadow-ray hit distance with the distance to the sampled point.
fn direct_radiance(
    scene: &Scene,
    point: &Vector3f,
    normal: &Vector3f,
    id: usize,
    sampler: &mut PrimarySampler,
    rng: &mut LcgRng,
) -> Color {
    let light = scene.light();
    let r1 = 2.0 * PI * sampler.next(rng);
    let r2 = 1.0 - 2.0 * sampler.next(rng);
    let s = (1.0 - r2 * r2).sqrt();
    let light_pos = *light.center()
        + Vector3f::new(s * r1.cos(), s * r1.sin(), r2) * (light.radius() + EPSILON);

    let light_normal = (light_pos - *light.center()).normalize();
    let light_dir = (light_pos - *point).normalize();
    let dist2 = (light_pos - *point).norm_squared();
    let dot0 = normal.dot(&light_dir);
    let dot1 = light_normal.dot(&(-light_dir));

    if dot0 >= 0.0 && dot1 >= 0.0 {
        let g = dot0 * dot1 / dist2;
        let shadow_ray = Ray3f::new(*point, light_dir);
        let t = scene.intersect(&shadow_ray).map_or(INF, |hit| hit.t);
        if (dist2.sqrt() - t).abs() < SHADOW_TOLERANCE {
            let area_pdf = 1.0 / (4.0 * PI * light.radius() * light.radius());
            return scene
                .sphere(id)
                .albedo()
                .component_mul(light.emission())
                * (INV_PI * g / area_pdf);
        }
    }
    spectrum::black()
}

// Radiance arriving along `ray`. All randomness flows through the primary
// sampler so a reset-and-replay reproduces the path coordinate for
// coordinate; the raw generator only backfills coordinates the sampler has
// never handed out before.
//
// Emitter hits count only at depth 0. Every later vertex gets its light
// through next-event estimation, which keeps the two estimates from being
// summed twice.
pub fn radiance(
    scene: &Scene,
    ray: &Ray3f,
    depth: u32,
    sampler: &mut PrimarySampler,
    rng: &mut LcgRng,
) -> Color {
    let hit = match scene.intersect(ray) {
        Some(hit) => hit,
        None => return spectrum::black(),
    };

    let obj = scene.sphere(hit.id);
    let hitpoint = ray.at(hit.t);
    let normal = (hitpoint - *obj.center()).normalize();
    let orienting_normal = if normal.dot(&ray.dir()) < 0.0 { normal } else { -normal };

    let mut rr_probability = spectrum::max_channel(obj.albedo());
    if depth > MAX_DEPTH {
        if sampler.next(rng) >= rr_probability {
            return spectrum::black();
        }
    } else {
        rr_probability = 1.0;
    }

    match obj.reflectance() {
        Reflectance::Diffuse => {
            if hit.id != scene.light_id() {
                let direct =
                    direct_radiance(scene, &hitpoint, &orienting_normal, hit.id, sampler, rng);

                // Cosine-weighted direction in the hemisphere around the
                // oriented normal.
                let w = orienting_normal;
                let (u, v) = orthonormal_basis(&w);
                let r1 = 2.0 * PI * sampler.next(rng);
                let r2 = sampler.next(rng);
                let r2s = r2.sqrt();
                let dir = (u * (r1.cos() * r2s) + v * (r1.sin() * r2s) + w * (1.0 - r2).sqrt())
                    .normalize();

                let indirect =
                    radiance(scene, &Ray3f::new(hitpoint, dir), depth + 1, sampler, rng);
                (direct + obj.albedo().component_mul(&indirect)) / rr_probability
            } else if depth == 0 {
                *obj.emission()
            } else {
                spectrum::black()
            }
        }
        Reflectance::Specular => {
            let reflection = Ray3f::new(hitpoint, reflect(&ray.dir(), &normal));
            let direct = direct_light_along(scene, &reflection);
            let indirect = radiance(scene, &reflection, depth + 1, sampler, rng);
            (direct + obj.albedo().component_mul(&indirect)) / rr_probability
        }
        Reflectance::Refractive => {
            let reflection = Ray3f::new(hitpoint, reflect(&ray.dir(), &normal));
            let direct_reflect = direct_light_along(scene, &reflection);

            let into = normal.dot(&orienting_normal) > 0.0;
            let nnt = if into { VACUUM_IOR / GLASS_IOR } else { GLASS_IOR / VACUUM_IOR };
            let ddn = ray.dir().dot(&orienting_normal);
            let cos2t = 1.0 - nnt * nnt * (1.0 - ddn * ddn);

            if cos2t < 0.0 {
                // Total internal reflection.
                let indirect = radiance(scene, &reflection, depth + 1, sampler, rng);
                return (direct_reflect + obj.albedo().component_mul(&indirect))
                    / rr_probability;
            }

            let sign = if into { 1.0 } else { -1.0 };
            let tdir =
                (ray.dir() * nnt - normal * (sign * (ddn * nnt + cos2t.sqrt()))).normalize();

            // Schlick approximation of the Fresnel reflectance.
            let a = GLASS_IOR - VACUUM_IOR;
            let b = GLASS_IOR + VACUUM_IOR;
            let r0 = (a * a) / (b * b);
            let c = 1.0 - if into { -ddn } else { tdir.dot(&normal) };
            let re = r0 + (1.0 - r0) * c.powi(5);
            let tr = 1.0 - re;
            let probability = 0.25 + 0.5 * re;

            let refraction = Ray3f::new(hitpoint, tdir);
            let direct_refract = direct_light_along(scene, &refraction);

            if depth > SPLIT_DEPTH {
                // One branch, chosen by the Fresnel-weighted lottery, so the
                // ray count stays linear in depth.
                if sampler.next(rng) < probability {
                    let reflected =
                        radiance(scene, &reflection, depth + 1, sampler, rng);
                    obj.albedo().component_mul(&((direct_reflect + reflected) * re))
                        / probability
                        / rr_probability
                } else {
                    let refracted =
                        radiance(scene, &refraction, depth + 1, sampler, rng);
                    obj.albedo().component_mul(&((direct_refract + refracted) * tr))
                        / (1.0 - probability)
                        / rr_probability
                }
            } else {
                let reflected = radiance(scene, &reflection, depth + 1, sampler, rng);
                let refracted = radiance(scene, &refraction, depth + 1, sampler, rng);
                obj.albedo().component_mul(
                    &((direct_reflect + reflected) * re + (direct_refract + refracted) * tr),
                ) / rr_probability
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::Sphere;

    fn assert_close(actual: &Color, expected: &Color, tolerance: Float) {
        for i in 0..3 {
            assert!(
                (actual[i] - expected[i]).abs() <= tolerance,
                "channel {}: {} vs {}",
                i,
                actual[i],
                expected[i]
            );
        }
    }

    fn light_sphere(radius: Float, center: Vector3f, emission: Color) -> Sphere {
        Sphere::new(radius, center, emission, spectrum::black(), Reflectance::Diffuse)
    }

    fn diffuse_sphere(radius: Float, center: Vector3f, albedo: Color) -> Sphere {
        Sphere::new(radius, center, spectrum::black(), albedo, Reflectance::Diffuse)
    }

    #[test]
    fn test_reflect_mirrors_across_normal() {
        let reflected = reflect(
            &Vector3f::new(0.6, -0.8, 0.0),
            &Vector3f::new(0.0, 1.0, 0.0),
        );
        assert_close(&reflected, &Vector3f::new(0.6, 0.8, 0.0), 1e-15);
    }

    #[test]
    fn test_miss_returns_black() {
        let scene = Scene::new(
            vec![light_sphere(1.0, Vector3f::new(0.0, 0.0, 10.0), Color::new(12.0, 12.0, 12.0))],
            0,
        );
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, -1.0));
        let mut sampler = PrimarySampler::from_coords(vec![0.5; 8]);
        let mut rng = LcgRng::new(1);
        let value = radiance(&scene, &ray, 0, &mut sampler, &mut rng);
        assert_eq!(value, spectrum::black());
    }

    #[test]
    fn test_emitter_hit_at_depth_zero_returns_emission() {
        let emission = Color::new(12.0, 12.0, 12.0);
        let scene = Scene::new(
            vec![light_sphere(1.0, Vector3f::new(0.0, 0.0, 5.0), emission)],
            0,
        );
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        let mut sampler = PrimarySampler::from_coords(vec![0.5; 8]);
        let mut rng = LcgRng::new(1);
        let value = radiance(&scene, &ray, 0, &mut sampler, &mut rng);
        assert_eq!(value, emission);
    }

    #[test]
    fn test_emitter_hit_at_depth_one_is_suppressed() {
        let scene = Scene::new(
            vec![light_sphere(1.0, Vector3f::new(0.0, 0.0, 5.0), Color::new(12.0, 12.0, 12.0))],
            0,
        );
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        let mut sampler = PrimarySampler::from_coords(vec![0.5; 8]);
        let mut rng = LcgRng::new(1);
        let value = radiance(&scene, &ray, 1, &mut sampler, &mut rng);
        assert_eq!(value, spectrum::black());
    }

    #[test]
    fn test_direct_radiance_frontal_unoccluded() {
        // Receiver surface point at z = 5 staring straight at a unit light
        // at the origin. Coordinates (0, 0) sample the light pole facing the
        // receiver, so every dot product collapses to 1.
        let emission = Color::new(10.0, 10.0, 10.0);
        let albedo = Color::new(0.5, 0.5, 0.5);
        let scene = Scene::new(
            vec![
                light_sphere(1.0, Vector3f::new(0.0, 0.0, 0.0), emission),
                diffuse_sphere(1.0, Vector3f::new(0.0, 0.0, 6.0), albedo),
            ],
            0,
        );
        let mut sampler = PrimarySampler::from_coords(vec![0.0, 0.0]);
        let mut rng = LcgRng::new(1);
        let value = direct_radiance(
            &scene,
            &Vector3f::new(0.0, 0.0, 5.0),
            &Vector3f::new(0.0, 0.0, -1.0),
            1,
            &mut sampler,
            &mut rng,
        );

        let d = 5.0 - (1.0 + EPSILON);
        let g = 1.0 / (d * d);
        let expected = 0.5 * 10.0 * INV_PI * g / (1.0 / (4.0 * PI));
        assert_close(&value, &Color::new(expected, expected, expected), 1e-9);
    }

    #[test]
    fn test_direct_radiance_occluded() {
        let scene = Scene::new(
            vec![
                light_sphere(1.0, Vector3f::new(0.0, 0.0, 0.0), Color::new(10.0, 10.0, 10.0)),
                diffuse_sphere(1.0, Vector3f::new(0.0, 0.0, 6.0), Color::new(0.5, 0.5, 0.5)),
                diffuse_sphere(0.5, Vector3f::new(0.0, 0.0, 2.5), Color::new(0.5, 0.5, 0.5)),
            ],
            0,
        );
        let mut sampler = PrimarySampler::from_coords(vec![0.0, 0.0]);
        let mut rng = LcgRng::new(1);
        let value = direct_radiance(
            &scene,
            &Vector3f::new(0.0, 0.0, 5.0),
            &Vector3f::new(0.0, 0.0, -1.0),
            1,
            &mut sampler,
            &mut rng,
        );
        assert_eq!(value, spectrum::black());
    }

    #[test]
    fn test_direct_radiance_backfacing() {
        let scene = Scene::new(
            vec![
                light_sphere(1.0, Vector3f::new(0.0, 0.0, 0.0), Color::new(10.0, 10.0, 10.0)),
                diffuse_sphere(1.0, Vector3f::new(0.0, 0.0, 6.0), Color::new(0.5, 0.5, 0.5)),
            ],
            0,
        );
        let mut sampler = PrimarySampler::from_coords(vec![0.0, 0.0]);
        let mut rng = LcgRng::new(1);
        let value = direct_radiance(
            &scene,
            &Vector3f::new(0.0, 0.0, 5.0),
            &Vector3f::new(0.0, 0.0, 1.0),
            1,
            &mut sampler,
            &mut rng,
        );
        assert_eq!(value, spectrum::black());
    }

    #[test]
    fn test_russian_roulette_kills_deep_path() {
        // Reflectance tops out at 0.5, so a roulette coordinate of 0.6
        // terminates the path before anything else is sampled.
        let scene = Scene::new(
            vec![
                light_sphere(1.0, Vector3f::new(0.0, 0.0, -100.0), Color::new(12.0, 12.0, 12.0)),
                diffuse_sphere(1.0, Vector3f::new(0.0, 0.0, 5.0), Color::new(0.5, 0.5, 0.5)),
            ],
            0,
        );
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        let mut sampler = PrimarySampler::from_coords(vec![0.6]);
        let mut rng = LcgRng::new(1);
        let value = radiance(&scene, &ray, MAX_DEPTH + 1, &mut sampler, &mut rng);
        assert_eq!(value, spectrum::black());
    }

    #[test]
    fn test_mirror_shows_light_without_albedo_tint() {
        // The deterministic direct term for mirrors is added outside the
        // albedo product, so the reflected lamp keeps its full emission.
        let emission = Color::new(12.0, 12.0, 12.0);
        let scene = Scene::new(
            vec![
                light_sphere(1.0, Vector3f::new(0.0, 0.0, -50.0), emission),
                Sphere::new(
                    1.0,
                    Vector3f::new(0.0, 0.0, 5.0),
                    spectrum::black(),
                    Color::new(0.9, 0.9, 0.9),
                    Reflectance::Specular,
                ),
            ],
            0,
        );
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        let mut sampler = PrimarySampler::from_coords(vec![0.5; 8]);
        let mut rng = LcgRng::new(1);
        let value = radiance(&scene, &ray, 0, &mut sampler, &mut rng);
        assert_close(&value, &emission, 1e-12);
    }

    #[test]
    fn test_fresnel_lottery_reflection_branch() {
        // Normal incidence on glass: Re collapses to R0 = 0.04 and the
        // branch probability to 0.27. A selector below that follows the
        // reflection, which sees the lamp straight behind the camera.
        let emission = Color::new(12.0, 12.0, 12.0);
        let albedo = Color::new(0.9, 0.9, 0.9);
        let scene = Scene::new(
            vec![
                light_sphere(1.0, Vector3f::new(0.0, 0.0, -50.0), emission),
                Sphere::new(
                    1.0,
                    Vector3f::new(0.0, 0.0, 5.0),
                    spectrum::black(),
                    albedo,
                    Reflectance::Refractive,
                ),
            ],
            0,
        );
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        let mut sampler = PrimarySampler::from_coords(vec![0.1, 0.5, 0.5, 0.5]);
        let mut rng = LcgRng::new(1);
        let value = radiance(&scene, &ray, SPLIT_DEPTH + 1, &mut sampler, &mut rng);

        let re = 0.04;
        let probability = 0.25 + 0.5 * re;
        let expected = 0.9 * 12.0 * re / probability;
        assert_close(&value, &Color::new(expected, expected, expected), 1e-12);
    }

    #[test]
    fn test_fresnel_lottery_transmission_exits_to_darkness() {
        // Selector above the branch probability transmits straight through
        // the ball both times and leaves the scene, so nothing comes back.
        let scene = Scene::new(
            vec![
                light_sphere(1.0, Vector3f::new(0.0, 0.0, -50.0), Color::new(12.0, 12.0, 12.0)),
                Sphere::new(
                    1.0,
                    Vector3f::new(0.0, 0.0, 5.0),
                    spectrum::black(),
                    Color::new(0.9, 0.9, 0.9),
                    Reflectance::Refractive,
                ),
            ],
            0,
        );
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 0.0, 1.0));
        let mut sampler = PrimarySampler::from_coords(vec![0.9, 0.9, 0.5, 0.5]);
        let mut rng = LcgRng::new(1);
        let value = radiance(&scene, &ray, SPLIT_DEPTH + 1, &mut sampler, &mut rng);
        assert_eq!(value, spectrum::black());
    }

    #[test]
    fn test_enclosed_box_estimate_converges() {
        // Grey box sealed on all six sides with one spherical lamp inside.
        // Short- and long-run sample means of the estimator must agree; a
        // biased bounce or a broken shadow test would pull them apart.
        let grey = Color::new(0.75, 0.75, 0.75);
        let scene = Scene::new(
            vec![
                light_sphere(5.0, Vector3f::new(50.0, 75.0, 81.6), Color::new(12.0, 12.0, 12.0)),
                diffuse_sphere(1e5, Vector3f::new(1e5 + 1.0, 40.8, 81.6), grey),
                diffuse_sphere(1e5, Vector3f::new(-1e5 + 99.0, 40.8, 81.6), grey),
                diffuse_sphere(1e5, Vector3f::new(50.0, 40.8, 1e5), grey),
                diffuse_sphere(1e5, Vector3f::new(50.0, 40.8, -1e5 + 170.0), grey),
                diffuse_sphere(1e5, Vector3f::new(50.0, 1e5, 81.6), grey),
                diffuse_sphere(1e5, Vector3f::new(50.0, -1e5 + 81.6, 81.6), grey),
            ],
            0,
        );
        let ray = Ray3f::new(Vector3f::new(50.0, 52.0, 150.0), Vector3f::new(0.0, 0.0, -1.0));

        let mut rng = LcgRng::new(7);
        let mean_luminance = |count: usize, rng: &mut LcgRng| {
            let mut total = 0.0;
            for _ in 0..count {
                let mut sampler = PrimarySampler::new(rng);
                let value = radiance(&scene, &ray, 0, &mut sampler, rng);
                total += spectrum::luminance(&value);
            }
            total / count as Float
        };

        let short_run = mean_luminance(4_000, &mut rng);
        let long_run = mean_luminance(40_000, &mut rng);
        assert!(long_run > 0.0);
        assert!(
            (short_run - long_run).abs() / long_run < 0.15,
            "{} vs {}",
            short_run,
            long_run
        );
    }
}
