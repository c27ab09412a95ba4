/* Copyright 2020 @TwoCookingMice */

use exr::prelude::*;

// Write EXR Image to file
pub fn write_exr_to_file(
    image: &std::vec::Vec<(f32, f32, f32)>,
    width: usize,
    height: usize,
    file_path: &str,
) {
    log::info!("Starting writing openexr images: {}.", file_path);

    // Film row 0 is the bottom scanline; EXR stores rows top-down.
    let write_result = write_rgb_file(file_path, width, height, |x, y| {
        let row = height - 1 - y;
        (
            image[row * width + x].0,
            image[row * width + x].1,
            image[row * width + x].2,
        )
    });
    match write_result {
        Ok(()) => println!("EXR written to: {}.", file_path),
        Err(e) => println!("EXR written error: {}.", e.to_string()),
    }
}
