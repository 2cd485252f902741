use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use std::sync::atomic::{AtomicI64, Ordering};

use catalog_core::{Entity, ProductId};
use catalog_products::Product;

use super::r#trait::{ProductRepository, RepositoryError};

/// In-memory product store.
///
/// Intended for tests/dev. Ids start at 1 and are never reused.
#[derive(Debug)]
pub struct InMemoryProductRepository {
    rows: RwLock<BTreeMap<ProductId, Product>>,
    next_id: AtomicI64,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select<F>(&self, keep: F) -> Result<Vec<Product>, RepositoryError>
    where
        F: Fn(&Product) -> bool,
    {
        let rows = self.rows.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(rows.values().filter(|p| keep(p)).cloned().collect())
    }
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn save(&self, product: Product) -> Result<Product, RepositoryError> {
        let mut rows = self.rows.write().map_err(|_| RepositoryError::Poisoned)?;

        let product = match product.id() {
            Some(id) => {
                if !rows.contains_key(&id) {
                    return Err(RepositoryError::Missing(id));
                }
                product
            }
            None => {
                let id = ProductId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
                product.with_assigned_id(id)
            }
        };

        if let Some(id) = product.id() {
            rows.insert(id, product.clone());
        }
        Ok(product)
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let rows = self.rows.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(rows.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        self.select(|_| true)
    }

    async fn find_by_price_greater_or_equal(
        &self,
        threshold: f64,
    ) -> Result<Vec<Product>, RepositoryError> {
        self.select(|p| p.price() >= threshold)
    }

    async fn exists_by_id(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let rows = self.rows.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(rows.contains_key(&id))
    }

    async fn delete_by_id(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut rows = self.rows.write().map_err(|_| RepositoryError::Poisoned)?;
        rows.remove(&id);
        Ok(())
    }
}
