/* Copyright 2026 @Yuchen Wong */

pub type Float = f64;
pub type Int = i32;

pub type Vector2f = nalgebra::Vector2<Float>;
pub type Vector3f = nalgebra::Vector3<Float>;

// Path tracing runs in double precision; EPSILON is the self-intersection
// threshold shared by every intersection test.
pub const EPSILON: Float = 1e-6;
pub const INF: Float = 1e20;
pub const PI: Float = 3.14159265358979323846;
pub const INV_PI: Float = 0.31830988618379067154;
