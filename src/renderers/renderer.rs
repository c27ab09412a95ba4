// Copyright @yucwang 2021

use crate::core::scene::Scene;
use crate::math::bitmap::Bitmap;
use crate::sensors::pinhole::PinholeCamera;

pub trait Renderer {
    fn render(&self, scene: &Scene, camera: &PinholeCamera) -> Bitmap;
}
