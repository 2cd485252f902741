use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    response::Response,
    routing::get,
    Json, Router,
};

use catalog_observability::TelemetryReporter;
use catalog_products::ProductRequest;

use crate::app::errors::ApiError;
use crate::app::services::ProductServices;
use crate::app::{dto, response};

const BASE_PATH: &str = "/api/products";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

pub async fn list_products(
    Extension(services): Extension<Arc<ProductServices>>,
    query: Result<Query<dto::ListProductsQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let telemetry = services.telemetry();
    let mut properties = TelemetryReporter::endpoint_properties("GET", BASE_PATH, None);

    let Query(query) = query.map_err(|rejection| {
        ApiError::report(
            telemetry,
            dto::malformed_query(rejection.body_text()),
            properties.clone(),
        )
    })?;

    let products = match query.min_price {
        Some(min_price) => {
            properties.insert("minPrice".to_string(), min_price.to_string());
            telemetry.record_event(
                "ProductsListFiltered",
                properties.clone(),
                Instant::now(),
                None,
            );
            services.fetch_by_min_price(min_price).await
        }
        None => {
            telemetry.record_event(
                "ProductsListRequested",
                properties.clone(),
                Instant::now(),
                None,
            );
            services.fetch_all().await
        }
    }
    .map_err(|e| ApiError::report(telemetry, e, properties))?;

    Ok(response::ok(products))
}

pub async fn get_product(
    Extension(services): Extension<Arc<ProductServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let telemetry = services.telemetry();
    let properties = entity_properties("GET", &id);

    let id = dto::parse_product_id(&id)
        .map_err(|e| ApiError::report(telemetry, e, properties.clone()))?;

    telemetry.record_event(
        "ProductDetailsRequested",
        properties.clone(),
        Instant::now(),
        None,
    );

    let product = services
        .fetch_by_id(id)
        .await
        .map_err(|e| ApiError::report(telemetry, e, properties))?;

    Ok(response::ok(product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<ProductServices>>,
    body: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let telemetry = services.telemetry();
    let properties = TelemetryReporter::endpoint_properties("POST", BASE_PATH, None);

    let Json(request) = body.map_err(|rejection| {
        ApiError::report(
            telemetry,
            dto::malformed_body(rejection.body_text()),
            properties.clone(),
        )
    })?;

    let product = services
        .create(&request)
        .await
        .map_err(|e| ApiError::report(telemetry, e, properties))?;

    Ok(response::created(product))
}

pub async fn update_product(
    Extension(services): Extension<Arc<ProductServices>>,
    Path(id): Path<String>,
    body: Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let telemetry = services.telemetry();
    let properties = entity_properties("PUT", &id);

    let id = dto::parse_product_id(&id)
        .map_err(|e| ApiError::report(telemetry, e, properties.clone()))?;

    let Json(request) = body.map_err(|rejection| {
        ApiError::report(
            telemetry,
            dto::malformed_body(rejection.body_text()),
            properties.clone(),
        )
    })?;

    telemetry.record_event(
        "ProductUpdateRequested",
        properties.clone(),
        Instant::now(),
        None,
    );

    let product = services
        .update(id, &request)
        .await
        .map_err(|e| ApiError::report(telemetry, e, properties))?;

    Ok(response::accepted(response::UPDATED, Some(product)))
}

pub async fn delete_product(
    Extension(services): Extension<Arc<ProductServices>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let telemetry = services.telemetry();
    let properties = entity_properties("DELETE", &id);

    let id = dto::parse_product_id(&id)
        .map_err(|e| ApiError::report(telemetry, e, properties.clone()))?;

    telemetry.record_event(
        "ProductDeleteRequested",
        properties.clone(),
        Instant::now(),
        None,
    );

    services
        .delete(id)
        .await
        .map_err(|e| ApiError::report(telemetry, e, properties))?;

    Ok(response::accepted::<()>(response::DELETED, None))
}

fn entity_properties(method: &str, raw_id: &str) -> catalog_observability::Properties {
    TelemetryReporter::endpoint_properties(method, &format!("{BASE_PATH}/{raw_id}"), Some(raw_id))
}
