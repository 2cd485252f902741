//! Infrastructure layer: product persistence adapters.

pub mod product_store;

pub use product_store::{
    InMemoryProductRepository, PostgresProductRepository, ProductRepository, RepositoryError,
};
