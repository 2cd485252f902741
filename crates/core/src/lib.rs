//! `catalog-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the catalog crates
//! (no storage, no HTTP, no telemetry).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, ValidationErrors};
pub use id::ProductId;
