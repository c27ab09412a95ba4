// Copyright @yucwang 2026

pub mod rng;
pub mod sampler;
pub mod scene;
