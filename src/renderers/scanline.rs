// Copyright @yucwang 2021

use crate::core::rng::LcgRng;
use crate::core::scene::Scene;
use crate::integrators::erpt::ErptIntegrator;
use crate::math::bitmap::Bitmap;
use crate::math::constants::Int;
use crate::sensors::pinhole::PinholeCamera;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

pub use super::renderer::Renderer;

pub struct ScanlineRenderer {
    integrator: ErptIntegrator,
    seed: u64,
}

impl ScanlineRenderer {
    pub fn new(integrator: ErptIntegrator, seed: u64) -> Self {
        Self { integrator, seed }
    }

    // Rows draw from independent generators so the work schedule cannot
    // change the picture. The cubed row index decorrelates neighbours.
    fn row_seed(&self, row: usize) -> u64 {
        let r = row as u64;
        ((self.seed & 0xFFF) << 32) | ((r * r * r) & 0xFFFF_FFFF)
    }
}

impl Renderer for ScanlineRenderer {
    fn render(&self, scene: &Scene, camera: &PinholeCamera) -> Bitmap {
        let width = camera.width();
        let height = camera.height();
        if width == 0 || height == 0 {
            return Bitmap::new(0, 0);
        }

        // Normalisation pass: one seed path per pixel fixes the quantum of
        // energy a mutation step may deposit.
        let mut rng = LcgRng::new(self.seed);
        let ed = self.integrator.deposition_energy(scene, camera, &mut rng);
        log::info!(
            "deposition energy: {}, {} spp, {} mutations per chain",
            ed,
            self.integrator.samples_per_pixel(),
            self.integrator.mutations_per_chain()
        );

        let progress = ProgressBar::new(height as u64);
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} rows")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let next_row = Arc::new(AtomicUsize::new(0));
        let thread_count = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let film = Mutex::new(Bitmap::new(width, height));

        thread::scope(|scope| {
            for _ in 0..thread_count {
                let next_row = Arc::clone(&next_row);
                let film = &film;
                let progress = &progress;
                scope.spawn(move || {
                    loop {
                        let row = next_row.fetch_add(1, Ordering::Relaxed);
                        if row >= height {
                            break;
                        }

                        // Chains wander across the whole film, so each row
                        // renders into a private full-frame buffer.
                        let mut local = Bitmap::new(width, height);
                        let mut rng = LcgRng::new(self.row_seed(row));
                        for x in 0..width {
                            self.integrator.render_pixel(
                                scene,
                                camera,
                                x as Int,
                                row as Int,
                                ed,
                                &mut local,
                                &mut rng,
                            );
                        }

                        {
                            let mut film = film.lock().unwrap_or_else(|e| e.into_inner());
                            film.accumulate(&local);
                        }
                        progress.inc(1);
                    }
                });
            }
        });
        progress.finish_and_clear();
        log::info!("finished rendering {} rows", height);

        film.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::{Float, Vector3f};

    fn reference_setup() -> (Scene, PinholeCamera) {
        let scene = Scene::cornell_box();
        let camera = PinholeCamera::look(
            Vector3f::new(50.0, 52.0, 295.6),
            Vector3f::new(0.0, -0.042612, -1.0),
            0.5135,
            8,
            8,
        );
        (scene, camera)
    }

    #[test]
    fn test_render_produces_finite_energy() {
        let (scene, camera) = reference_setup();
        let renderer = ScanlineRenderer::new(ErptIntegrator::new(1, 2), 42);
        let image = renderer.render(&scene, &camera);

        assert_eq!(image.width(), 8);
        assert_eq!(image.height(), 8);
        for pixel in image.pixels() {
            for i in 0..3 {
                assert!(pixel[i].is_finite());
                assert!(pixel[i] >= 0.0);
            }
        }
        assert!(image.total_luminance() > 0.0);
    }

    #[test]
    fn test_render_is_repeatable_for_a_seed() {
        // Row generators are seeded by row index, so only the merge order
        // differs between runs; pixel values agree up to summation
        // reordering.
        let (scene, camera) = reference_setup();
        let renderer = ScanlineRenderer::new(ErptIntegrator::new(1, 1), 7);
        let first = renderer.render(&scene, &camera);
        let second = renderer.render(&scene, &camera);

        for (a, b) in first.pixels().iter().zip(second.pixels().iter()) {
            for i in 0..3 {
                let tolerance = 1e-9 * (1.0 + a[i].abs());
                assert!(
                    (a[i] - b[i]).abs() <= tolerance,
                    "{} vs {}",
                    a[i],
                    b[i]
                );
            }
        }
    }

    #[test]
    fn test_seeds_change_the_estimate() {
        let (scene, camera) = reference_setup();
        let first = ScanlineRenderer::new(ErptIntegrator::new(1, 1), 1).render(&scene, &camera);
        let second = ScanlineRenderer::new(ErptIntegrator::new(1, 1), 2).render(&scene, &camera);

        let difference: Float = first
            .pixels()
            .iter()
            .zip(second.pixels().iter())
            .map(|(a, b)| (a - b).norm())
            .sum();
        assert!(difference > 0.0);
    }
}
