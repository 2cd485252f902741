//! HTTP API: configuration, product operations, routing and response shaping.

pub mod app;
pub mod config;
