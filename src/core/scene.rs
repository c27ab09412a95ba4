// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector3f, EPSILON};
use crate::math::ray::Ray3f;
use crate::math::spectrum::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reflectance {
    Diffuse,
    Specular,
    Refractive,
}

#[derive(Clone, Debug)]
pub struct Sphere {
    radius: Float,
    center: Vector3f,
    emission: Color,
    albedo: Color,
    reflectance: Reflectance,
}

impl Sphere {
    pub fn new(
        radius: Float,
        center: Vector3f,
        emission: Color,
        albedo: Color,
        reflectance: Reflectance,
    ) -> Self {
        Self { radius, center, emission, albedo, reflectance }
    }

    pub fn radius(&self) -> Float {
        self.radius
    }

    pub fn center(&self) -> &Vector3f {
        &self.center
    }

    pub fn emission(&self) -> &Color {
        &self.emission
    }

    pub fn albedo(&self) -> &Color {
        &self.albedo
    }

    pub fn reflectance(&self) -> Reflectance {
        self.reflectance
    }

    // Nearer positive root of the quadratic, with EPSILON keeping rays from
    // re-hitting the surface they just left.
    pub fn intersect(&self, ray: &Ray3f) -> Option<Float> {
        let op = self.center - ray.origin();
        let b = op.dot(&ray.dir());
        let det = b * b - op.dot(&op) + self.radius * self.radius;
        if det < 0.0 {
            return None;
        }
        let det = det.sqrt();
        let t = b - det;
        if t > EPSILON {
            return Some(t);
        }
        let t = b + det;
        if t > EPSILON {
            return Some(t);
        }
        None
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Hit {
    pub t: Float,
    pub id: usize,
}

pub struct Scene {
    spheres: Vec<Sphere>,
    light_id: usize,
}

impl Scene {
    pub fn new(spheres: Vec<Sphere>, light_id: usize) -> Self {
        debug_assert!(light_id < spheres.len());
        Self { spheres, light_id }
    }

    pub fn sphere(&self, id: usize) -> &Sphere {
        &self.spheres[id]
    }

    pub fn light(&self) -> &Sphere {
        &self.spheres[self.light_id]
    }

    pub fn light_id(&self) -> usize {
        self.light_id
    }

    pub fn num_spheres(&self) -> usize {
        self.spheres.len()
    }

    // Linear scan over every sphere; with a handful of primitives this beats
    // any acceleration structure.
    pub fn intersect(&self, ray: &Ray3f) -> Option<Hit> {
        let mut nearest: Option<Hit> = None;
        for (id, sphere) in self.spheres.iter().enumerate() {
            if let Some(t) = sphere.intersect(ray) {
                if nearest.map_or(true, |hit| t < hit.t) {
                    nearest = Some(Hit { t, id });
                }
            }
        }
        nearest
    }

    // Box built from six giant wall spheres, two 16.5-radius balls and one
    // spherical lamp. The lamp sits at index 0 so callers can sample it
    // without searching.
    pub fn cornell_box() -> Self {
        let grey = Color::new(0.75, 0.75, 0.75);
        let black = Color::new(0.0, 0.0, 0.0);
        let spheres = vec![
            Sphere::new(
                5.0,
                Vector3f::new(50.0, 75.0, 81.6),
                Color::new(12.0, 12.0, 12.0),
                black,
                Reflectance::Diffuse,
            ),
            Sphere::new(
                1e5,
                Vector3f::new(1e5 + 1.0, 40.8, 81.6),
                black,
                Color::new(0.75, 0.25, 0.25),
                Reflectance::Diffuse,
            ),
            Sphere::new(
                1e5,
                Vector3f::new(-1e5 + 99.0, 40.8, 81.6),
                black,
                Color::new(0.25, 0.25, 0.75),
                Reflectance::Diffuse,
            ),
            Sphere::new(
                1e5,
                Vector3f::new(50.0, 40.8, 1e5),
                black,
                grey,
                Reflectance::Diffuse,
            ),
            Sphere::new(
                1e5,
                Vector3f::new(50.0, 40.8, -1e5 + 170.0),
                black,
                black,
                Reflectance::Diffuse,
            ),
            Sphere::new(
                1e5,
                Vector3f::new(50.0, 1e5, 81.6),
                black,
                grey,
                Reflectance::Diffuse,
            ),
            Sphere::new(
                1e5,
                Vector3f::new(50.0, -1e5 + 81.6, 81.6),
                black,
                grey,
                Reflectance::Diffuse,
            ),
            Sphere::new(
                16.5,
                Vector3f::new(27.0, 16.5, 47.0),
                black,
                Color::new(0.99, 0.99, 0.99),
                Reflectance::Specular,
            ),
            Sphere::new(
                16.5,
                Vector3f::new(73.0, 16.5, 78.0),
                black,
                Color::new(0.99, 0.99, 0.99),
                Reflectance::Refractive,
            ),
        ];
        Self::new(spheres, 0)
    }
}
