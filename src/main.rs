// Copyright 2020 TwoCookingMice

use canele::core::scene::Scene;
use canele::integrators::erpt::ErptIntegrator;
use canele::io::exr_utils;
use canele::math::constants::Vector3f;
use canele::renderers::scanline::{Renderer, ScanlineRenderer};
use canele::sensors::pinhole::PinholeCamera;

use std::env;

fn main() {
    env::set_var("RUST_LOG", "info");
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage: {} <output.exr> [--width N] [--height N] [--spp N] [--mutations N] [--seed N]",
            args[0]
        );
        std::process::exit(1);
    }

    let output_path = &args[1];
    let mut width: usize = 320;
    let mut height: usize = 240;
    let mut spp: u32 = 10;
    let mut mutations: u32 = 100;
    let mut seed: u64 = 0;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--width" => {
                i += 1;
                width = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(width);
            }
            "--height" => {
                i += 1;
                height = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(height);
            }
            "--spp" => {
                i += 1;
                spp = args.get(i).and_then(|v| v.parse::<u32>().ok()).unwrap_or(spp);
            }
            "--mutations" => {
                i += 1;
                mutations = args.get(i).and_then(|v| v.parse::<u32>().ok()).unwrap_or(mutations);
            }
            "--seed" => {
                i += 1;
                seed = args.get(i).and_then(|v| v.parse::<u64>().ok()).unwrap_or(seed);
            }
            _ => {}
        }
        i += 1;
    }

    let scene = Scene::cornell_box();
    let camera = PinholeCamera::look(
        Vector3f::new(50.0, 52.0, 295.6),
        Vector3f::new(0.0, -0.042612, -1.0),
        0.5135,
        width,
        height,
    );

    let renderer = ScanlineRenderer::new(ErptIntegrator::new(spp, mutations), seed);
    let image = renderer.render(&scene, &camera);
    exr_utils::write_exr_to_file(&image.raw_copy(), image.width(), image.height(), output_path);
}
