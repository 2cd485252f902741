//! Product operations and process wiring.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use chrono::Utc;

use catalog_core::{DomainError, DomainResult, Entity, ProductId};
use catalog_infra::{InMemoryProductRepository, PostgresProductRepository, ProductRepository};
use catalog_observability::{HttpTelemetry, Properties, TelemetryReporter, telemetry::reporter::elapsed_ms};
use catalog_products::{Product, ProductRequest};

use crate::app::errors::track_failure;
use crate::config::{AppConfig, StoreConfig};

const RESOURCE: &str = "Product";

/// The product use cases.
///
/// Each one reports its outcome to telemetry. Storage failures are recorded
/// as exceptions with the operation's properties and returned as
/// [`DomainError::Unclassified`].
#[derive(Clone)]
pub struct ProductServices {
    repository: Arc<dyn ProductRepository>,
    telemetry: Arc<TelemetryReporter>,
}

impl ProductServices {
    pub fn new(repository: Arc<dyn ProductRepository>, telemetry: Arc<TelemetryReporter>) -> Self {
        Self {
            repository,
            telemetry,
        }
    }

    pub fn telemetry(&self) -> &TelemetryReporter {
        &self.telemetry
    }

    pub async fn create(&self, request: &ProductRequest) -> DomainResult<Product> {
        let started = Instant::now();
        let mut properties = operation("createProduct");
        if let Some(name) = &request.name {
            properties.insert("productName".to_string(), name.clone());
        }

        let input = match request.validate() {
            Ok(input) => input,
            Err(err) => {
                track_failure(&self.telemetry, &err, properties);
                return Err(err);
            }
        };

        let price = input.price();
        let saved = self
            .repository
            .save(Product::new(input, Utc::now()))
            .await
            .map_err(|e| self.storage_failure(e.into(), &properties))?;

        tracing::debug!(product_id = ?saved.id(), "product created");
        self.telemetry
            .record_event("ProductCreated", properties, started, Some(price));
        Ok(saved)
    }

    pub async fn fetch_all(&self) -> DomainResult<Vec<Product>> {
        let started = Instant::now();
        let products = self
            .repository
            .find_all()
            .await
            .map_err(|e| self.storage_failure(e.into(), &operation("getAllProducts")))?;

        self.telemetry
            .record_metric("ProductListingPerformance", elapsed_ms(started));
        Ok(products)
    }

    pub async fn fetch_by_min_price(&self, min_price: f64) -> DomainResult<Vec<Product>> {
        let started = Instant::now();
        let mut properties = operation("getProductsByMinPrice");
        properties.insert("minPrice".to_string(), min_price.to_string());

        if !min_price.is_finite() {
            let err = DomainError::invalid_field("minPrice", "minPrice must be a finite number");
            track_failure(&self.telemetry, &err, properties);
            return Err(err);
        }

        let products = self
            .repository
            .find_by_price_greater_or_equal(min_price)
            .await
            .map_err(|e| self.storage_failure(e.into(), &properties))?;

        self.telemetry.record_event(
            "ProductFilteredByPrice",
            properties,
            started,
            Some(products.len() as f64),
        );
        Ok(products)
    }

    pub async fn fetch_by_id(&self, id: ProductId) -> DomainResult<Product> {
        let started = Instant::now();
        let properties = product_operation("getProductById", id);

        let found = self
            .repository
            .find_by_id(id)
            .await
            .map_err(|e| self.storage_failure(e.into(), &properties))?;

        match found {
            Some(product) => {
                self.telemetry
                    .record_event("ProductFound", properties, started, None);
                Ok(product)
            }
            None => {
                self.telemetry
                    .record_event("ProductNotFound", properties, started, None);
                Err(DomainError::not_found(RESOURCE, id))
            }
        }
    }

    pub async fn update(&self, id: ProductId, request: &ProductRequest) -> DomainResult<Product> {
        let started = Instant::now();
        let mut properties = product_operation("updateProduct", id);
        if let Some(name) = &request.name {
            properties.insert("productName".to_string(), name.clone());
        }

        let input = match request.validate() {
            Ok(input) => input,
            Err(err) => {
                track_failure(&self.telemetry, &err, properties);
                return Err(err);
            }
        };

        let existing = self
            .repository
            .find_by_id(id)
            .await
            .map_err(|e| self.storage_failure(e.into(), &properties))?;

        let Some(mut product) = existing else {
            self.telemetry
                .record_event("ProductUpdateFailed_NotFound", properties, started, None);
            return Err(DomainError::not_found(RESOURCE, id));
        };

        product.apply_update(input, Utc::now());
        let saved = self
            .repository
            .save(product)
            .await
            .map_err(|e| self.storage_failure(e.into(), &properties))?;

        self.telemetry
            .record_event("ProductUpdated", properties, started, None);
        Ok(saved)
    }

    pub async fn delete(&self, id: ProductId) -> DomainResult<()> {
        let started = Instant::now();
        let properties = product_operation("deleteProduct", id);

        let exists = self
            .repository
            .exists_by_id(id)
            .await
            .map_err(|e| self.storage_failure(e.into(), &properties))?;

        if !exists {
            self.telemetry
                .record_event("ProductDeleteFailed_NotFound", properties, started, None);
            return Err(DomainError::not_found(RESOURCE, id));
        }

        self.repository
            .delete_by_id(id)
            .await
            .map_err(|e| self.storage_failure(e.into(), &properties))?;

        self.telemetry
            .record_event("ProductDeleted", properties, started, None);
        Ok(())
    }

    fn storage_failure(&self, err: DomainError, properties: &Properties) -> DomainError {
        track_failure(&self.telemetry, &err, properties.clone());
        err
    }
}

fn operation(name: &str) -> Properties {
    let mut properties = Properties::new();
    properties.insert("operation".to_string(), name.to_string());
    properties
}

fn product_operation(name: &str, id: ProductId) -> Properties {
    let mut properties = operation(name);
    properties.insert("productId".to_string(), id.to_string());
    properties
}

/// Build the store and telemetry backend selected by `config`.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<ProductServices> {
    let telemetry = Arc::new(build_telemetry(config)?);

    let repository: Arc<dyn ProductRepository> = match &config.store {
        StoreConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let repo = PostgresProductRepository::connect(database_url, *max_connections)
                .await
                .context("failed to connect to postgres")?;
            repo.ensure_schema()
                .await
                .context("failed to prepare products schema")?;
            tracing::info!(max_connections, "using postgres product store");
            Arc::new(repo)
        }
        StoreConfig::InMemory => {
            tracing::info!("using in-memory product store");
            Arc::new(InMemoryProductRepository::new())
        }
    };

    Ok(ProductServices::new(repository, telemetry))
}

fn build_telemetry(config: &AppConfig) -> anyhow::Result<TelemetryReporter> {
    let settings = &config.telemetry;
    match &settings.endpoint {
        Some(endpoint) => {
            let client = HttpTelemetry::new(
                endpoint.clone(),
                settings.instrumentation_key.clone(),
                settings.timeout,
            )
            .context("failed to build telemetry client")?;
            tracing::info!(endpoint = endpoint.as_str(), "sending telemetry over http");
            Ok(TelemetryReporter::new(Arc::new(client), settings.context.clone()))
        }
        None => Ok(TelemetryReporter::tracing(settings.context.clone())),
    }
}
