//! Products domain module.
//!
//! The product record, the write-side request shape and its field validation.
//! Pure domain logic: no IO, no HTTP, no storage.

pub mod product;

pub use product::{Product, ProductRequest, ValidProduct};
