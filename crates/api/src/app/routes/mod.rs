use axum::Router;

pub mod products;
pub mod system;

/// Router for the product resource.
pub fn router() -> Router {
    Router::new().nest("/api/products", products::router())
}
