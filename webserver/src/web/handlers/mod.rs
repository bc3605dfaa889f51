//! HTTP request handlers

pub mod api;

pub use api::{generate_drill, generate_plan, health, recommend};
