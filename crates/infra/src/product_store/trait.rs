use std::sync::Arc;

use thiserror::Error;

use catalog_core::{DomainError, ProductId};
use catalog_products::Product;

/// Errors raised by a product store.
///
/// None of these are caller mistakes; they all surface as unclassified
/// failures at the domain boundary.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error in {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("product store unavailable: {0}")]
    Unavailable(String),

    #[error("product {0} vanished before it could be saved")]
    Missing(ProductId),

    #[error("product store lock poisoned")]
    Poisoned,
}

impl From<RepositoryError> for DomainError {
    fn from(err: RepositoryError) -> Self {
        DomainError::unclassified(err)
    }
}

/// Storage contract for product records.
///
/// `save` inserts when the record has no id yet (the store assigns one) and
/// overwrites the stored row otherwise. Listing methods return records in
/// ascending id order.
#[async_trait::async_trait]
pub trait ProductRepository: Send + Sync {
    async fn save(&self, product: Product) -> Result<Product, RepositoryError>;

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Records with `price >= threshold`.
    async fn find_by_price_greater_or_equal(
        &self,
        threshold: f64,
    ) -> Result<Vec<Product>, RepositoryError>;

    async fn exists_by_id(&self, id: ProductId) -> Result<bool, RepositoryError>;

    /// Remove a record. Deleting an absent id is not an error.
    async fn delete_by_id(&self, id: ProductId) -> Result<(), RepositoryError>;
}

#[async_trait::async_trait]
impl<S> ProductRepository for Arc<S>
where
    S: ProductRepository + ?Sized,
{
    async fn save(&self, product: Product) -> Result<Product, RepositoryError> {
        (**self).save(product).await
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        (**self).find_by_id(id).await
    }

    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        (**self).find_all().await
    }

    async fn find_by_price_greater_or_equal(
        &self,
        threshold: f64,
    ) -> Result<Vec<Product>, RepositoryError> {
        (**self).find_by_price_greater_or_equal(threshold).await
    }

    async fn exists_by_id(&self, id: ProductId) -> Result<bool, RepositoryError> {
        (**self).exists_by_id(id).await
    }

    async fn delete_by_id(&self, id: ProductId) -> Result<(), RepositoryError> {
        (**self).delete_by_id(id).await
    }
}
