// Copyright @yucwang 2026

pub mod erpt;
pub mod path;
