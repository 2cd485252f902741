//! Product persistence boundary.
//!
//! [`ProductRepository`] is the storage contract the operations depend on.
//! Two adapters ship with it: an in-memory map for tests/dev and a
//! Postgres table via SQLx.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryProductRepository;
pub use postgres::PostgresProductRepository;
pub use r#trait::{ProductRepository, RepositoryError};
