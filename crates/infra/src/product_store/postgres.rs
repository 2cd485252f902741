//! Postgres-backed product store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | RepositoryError |
//! |------------|-----------------|
//! | `PoolClosed`, `PoolTimedOut`, `Io` | `Unavailable` |
//! | anything else | `Database` (tagged with the operation name) |
//!
//! `save` on a record whose row no longer exists yields `Missing`.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, postgres::PgPoolOptions};
use tracing::instrument;

use catalog_core::{Entity, ProductId};
use catalog_products::Product;

use super::r#trait::{ProductRepository, RepositoryError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id          BIGSERIAL PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT NOT NULL,
    price       DOUBLE PRECISION NOT NULL CHECK (price >= 0),
    created_at  TIMESTAMPTZ NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS products_price_idx ON products (price);
"#;

#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product::restore(
            ProductId::new(row.id),
            row.name,
            row.description,
            row.price,
            row.created_at,
            row.updated_at,
        )
    }
}

/// Product store over the `products` table.
///
/// `PgPool` is internally reference counted, so clones share connections.
#[derive(Debug, Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `products` table and its price index if missing.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    async fn insert(&self, product: &Product) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(
            r#"
            INSERT INTO products (name, description, price, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, price, created_at, updated_at
            "#,
        )
        .bind(product.name())
        .bind(product.description())
        .bind(product.price())
        .bind(product.created_at())
        .bind(product.updated_at())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;

        Ok(row.into())
    }

    async fn update(&self, id: ProductId, product: &Product) -> Result<Product, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            UPDATE products
            SET name = $2, description = $3, price = $4, updated_at = $5
            WHERE id = $1
            RETURNING id, name, description, price, created_at, updated_at
            "#,
        )
        .bind(id.get())
        .bind(product.name())
        .bind(product.description())
        .bind(product.price())
        .bind(product.updated_at())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;

        row.map(Product::from).ok_or(RepositoryError::Missing(id))
    }
}

#[async_trait::async_trait]
impl ProductRepository for PostgresProductRepository {
    #[instrument(skip_all, fields(product_id = ?product.id()))]
    async fn save(&self, product: Product) -> Result<Product, RepositoryError> {
        match product.id() {
            Some(id) => self.update(id, &product).await,
            None => self.insert(&product).await,
        }
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, price, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_product", e))?;

        Ok(row.map(Product::from))
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, price, created_at, updated_at
            FROM products
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_price_greater_or_equal(
        &self,
        threshold: f64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, price, created_at, updated_at
            FROM products
            WHERE price >= $1
            ORDER BY id
            "#,
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products_by_price", e))?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self))]
    async fn exists_by_id(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
            .bind(id.get())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("product_exists", e))?;
        Ok(exists)
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: ProductId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        Ok(())
    }
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
            RepositoryError::Unavailable(format!("{operation}: {err}"))
        }
        sqlx::Error::Io(io) => RepositoryError::Unavailable(format!("{operation}: {io}")),
        other => {
            tracing::warn!(operation, error = %other, "product store query failed");
            RepositoryError::Database {
                operation,
                source: other,
            }
        }
    }
}
