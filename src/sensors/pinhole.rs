// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;

// Rays start well in front of the aperture so the camera can sit outside an
// enclosing shell and still see its interior.
const RAY_ORIGIN_OFFSET: Float = 130.0;

pub struct PinholeCamera {
    origin: Vector3f,
    forward: Vector3f,
    cx: Vector3f,
    cy: Vector3f,
    width: usize,
    height: usize,
}

impl PinholeCamera {
    pub fn new(
        origin: Vector3f,
        forward: Vector3f,
        cx: Vector3f,
        cy: Vector3f,
        width: usize,
        height: usize,
    ) -> Self {
        Self { origin, forward, cx, cy, width, height }
    }

    // Basis from a view direction and a screen scale: cx spans the image
    // plane horizontally (aspect-corrected), cy is perpendicular to both cx
    // and the view direction. cy ends up pointing up, so film row 0 is the
    // bottom scanline.
    pub fn look(
        origin: Vector3f,
        dir: Vector3f,
        screen_scale: Float,
        width: usize,
        height: usize,
    ) -> Self {
        let forward = dir.normalize();
        let cx = Vector3f::new(width as Float * screen_scale / height as Float, 0.0, 0.0);
        let cy = cx.cross(&forward).normalize() * screen_scale;
        Self::new(origin, forward, cx, cy, width, height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    // uv is the continuous image-plane position in [0, 1)^2.
    pub fn sample_ray(&self, uv: &Vector2f) -> Ray3f {
        let d = self.cx * (uv.x - 0.5) + self.cy * (uv.y - 0.5) + self.forward;
        Ray3f::new(self.origin + d * RAY_ORIGIN_OFFSET, d)
    }
}
