// Copyright 2026 @TwoCookingMice

use super::constants::Float;
use super::spectrum::Color;

use std::ops;
use std::vec::Vec;

// Additive accumulation buffer in linear color. Workers render into private
// bitmaps and fold them into the shared one with accumulate().
#[derive(Clone, Debug)]
pub struct Bitmap {
    data: Vec<Color>,
    height: usize,
    width: usize,
}

impl ops::Index<(usize, usize)> for Bitmap {
    type Output = Color;

    fn index(&self, index: (usize, usize)) -> &Color {
        &self.data[index.0 + self.width * index.1]
    }
}

impl ops::IndexMut<(usize, usize)> for Bitmap {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Color {
        &mut self.data[index.0 + self.width * index.1]
    }
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        let pixel_number = width * height;
        Self {
            data: vec![Color::zeros(); pixel_number],
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.data
    }

    // Pixel-wise additive merge of a same-sized bitmap.
    pub fn accumulate(&mut self, other: &Bitmap) {
        debug_assert_eq!(self.width, other.width);
        debug_assert_eq!(self.height, other.height);
        for (dst, src) in self.data.iter_mut().zip(other.data.iter()) {
            *dst += *src;
        }
    }

    pub fn total_luminance(&self) -> Float {
        self.data
            .iter()
            .map(super::spectrum::luminance)
            .sum()
    }

    // Downcast for the EXR writer, which stores 32-bit channels.
    pub fn raw_copy(&self) -> Vec<(f32, f32, f32)> {
        self.data
            .iter()
            .map(|c| (c.x as f32, c.y as f32, c.z as f32))
            .collect()
    }
}

/* Test for Bitmap */
