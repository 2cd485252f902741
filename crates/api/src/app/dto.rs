//! Request extraction helpers.

use serde::{Deserialize, Deserializer};

use catalog_core::{DomainError, ProductId};

/// `GET /api/products?minPrice=..`
///
/// An empty `minPrice` means no filter.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct ListProductsQuery {
    #[serde(rename = "minPrice", default, deserialize_with = "empty_as_none")]
    pub min_price: Option<f64>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

pub fn parse_product_id(raw: &str) -> Result<ProductId, DomainError> {
    raw.parse()
}

/// Unparseable request body.
pub fn malformed_body(detail: impl Into<String>) -> DomainError {
    DomainError::invalid_field("body", detail)
}

/// Unparseable query string.
pub fn malformed_query(detail: impl Into<String>) -> DomainError {
    DomainError::invalid_field("minPrice", detail)
}
