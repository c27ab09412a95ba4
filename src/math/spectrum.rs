// Copyright 2026 @TwoCookingMice

use super::constants::{Float, Vector3f};

// Linear RGB radiance. Kept as a plain vector so the estimator arithmetic
// (component products, scalar scaling) stays on nalgebra.
pub type Color = Vector3f;

pub fn black() -> Color {
    Color::zeros()
}

// Rec. 709 luma weights, the scalar the Metropolis chain compares paths by.
pub fn luminance(c: &Color) -> Float {
    0.2126 * c.x + 0.7152 * c.y + 0.0722 * c.z
}

// Largest channel, used as the Russian roulette survival probability.
pub fn max_channel(c: &Color) -> Float {
    c.x.max(c.y).max(c.z)
}

pub fn is_black(c: &Color) -> bool {
    c.x == 0.0 && c.y == 0.0 && c.z == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Float, b: Float) {
        assert!((a - b).abs() < 1e-12, "expected {} ≈ {}", a, b);
    }

    #[test]
    fn test_luminance_weights_sum_to_one() {
        assert_close(luminance(&Color::new(1.0, 1.0, 1.0)), 1.0);
    }

    #[test]
    fn test_luminance_single_channels() {
        assert_close(luminance(&Color::new(1.0, 0.0, 0.0)), 0.2126);
        assert_close(luminance(&Color::new(0.0, 1.0, 0.0)), 0.7152);
        assert_close(luminance(&Color::new(0.0, 0.0, 1.0)), 0.0722);
    }

    #[test]
    fn test_max_channel() {
        assert_close(max_channel(&Color::new(0.75, 0.25, 0.25)), 0.75);
        assert_close(max_channel(&Color::new(0.1, 0.9, 0.3)), 0.9);
        assert_close(max_channel(&Color::new(0.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_is_black() {
        assert!(is_black(&black()));
        assert!(!is_black(&Color::new(0.0, 1e-9, 0.0)));
    }
}
