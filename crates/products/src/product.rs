use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult, Entity, ProductId, ValidationErrors};

pub const NAME_REQUIRED: &str = "Product name is required";
pub const DESCRIPTION_REQUIRED: &str = "Product description is required";
pub const PRICE_REQUIRED: &str = "Price is required";
pub const PRICE_NEGATIVE: &str = "Price must be positive";

/// A catalog item as stored.
///
/// `id` is `None` until the record has been saved once. `created_at` never
/// changes after construction and `updated_at` only moves forward.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: Option<ProductId>,
    name: String,
    description: String,
    price: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Product {
    /// Build an unsaved record from validated input. Both timestamps are `now`.
    pub fn new(input: ValidProduct, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            name: input.name,
            description: input.description,
            price: input.price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrate a record loaded from storage.
    pub fn restore(
        id: ProductId,
        name: String,
        description: String,
        price: f64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(id),
            name,
            description,
            price,
            created_at,
            updated_at,
        }
    }

    /// Attach the identifier assigned by the store. Already-saved records keep theirs.
    pub fn with_assigned_id(mut self, id: ProductId) -> Self {
        if self.id.is_none() {
            self.id = Some(id);
        }
        self
    }

    /// Overwrite the mutable fields and refresh `updated_at`.
    ///
    /// `updated_at` never moves backwards, even if the clock does.
    pub fn apply_update(&mut self, input: ValidProduct, now: DateTime<Utc>) {
        self.name = input.name;
        self.description = input.description;
        self.price = input.price;
        self.updated_at = now.max(self.updated_at);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> Option<ProductId> {
        self.id
    }
}

/// Write-side request body for create and update.
///
/// Every field is optional on the wire so that a missing field is reported as
/// a validation failure rather than a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl ProductRequest {
    pub fn new(name: impl Into<String>, description: impl Into<String>, price: f64) -> Self {
        Self {
            name: Some(name.into()),
            description: Some(description.into()),
            price: Some(price),
        }
    }

    /// Field validation: non-blank name and description, present non-negative price.
    ///
    /// A negative price also records the attempted value as `attemptedPrice`
    /// context on the returned error.
    pub fn validate(&self) -> DomainResult<ValidProduct> {
        let mut errors = ValidationErrors::new();

        let name = non_blank(self.name.as_deref());
        if name.is_none() {
            errors.add("name", NAME_REQUIRED);
        }

        let description = non_blank(self.description.as_deref());
        if description.is_none() {
            errors.add("description", DESCRIPTION_REQUIRED);
        }

        match self.price {
            None => errors.add("price", PRICE_REQUIRED),
            Some(p) if p.is_nan() || p.is_infinite() => errors.add("price", PRICE_REQUIRED),
            Some(p) if p < 0.0 => {
                errors.add("price", PRICE_NEGATIVE);
                errors = errors.with_context("attemptedPrice", p.to_string());
            }
            Some(_) => {}
        }

        match (name, description, self.price) {
            (Some(name), Some(description), Some(price)) if errors.is_empty() => Ok(ValidProduct {
                name: name.to_string(),
                description: description.to_string(),
                price,
            }),
            _ => Err(DomainError::validation(errors)),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// A request that passed field validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidProduct {
    name: String,
    description: String,
    price: f64,
}

impl ValidProduct {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> f64 {
        self.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn field_errors(err: DomainError) -> ValidationErrors {
        match err {
            DomainError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_request_passes() {
        let valid = ProductRequest::new("Product 1", "desc", 10.99).validate().unwrap();
        assert_eq!(valid.name(), "Product 1");
        assert_eq!(valid.description(), "desc");
        assert_eq!(valid.price(), 10.99);
    }

    #[test]
    fn zero_price_is_allowed() {
        assert!(ProductRequest::new("Free", "sample", 0.0).validate().is_ok());
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let errors = field_errors(ProductRequest::default().validate().unwrap_err());
        assert_eq!(errors.field_names(), vec!["description", "name", "price"]);
        assert_eq!(errors.fields()["name"], NAME_REQUIRED);
        assert_eq!(errors.fields()["description"], DESCRIPTION_REQUIRED);
        assert_eq!(errors.fields()["price"], PRICE_REQUIRED);
    }

    #[test]
    fn blank_strings_are_rejected() {
        let request = ProductRequest {
            name: Some("   ".to_string()),
            description: Some(String::new()),
            price: Some(1.0),
        };
        let errors = field_errors(request.validate().unwrap_err());
        assert_eq!(errors.field_names(), vec!["description", "name"]);
    }

    #[test]
    fn negative_price_is_tagged_with_attempted_value() {
        let errors = field_errors(ProductRequest::new("a", "b", -2.5).validate().unwrap_err());
        assert_eq!(errors.fields()["price"], PRICE_NEGATIVE);
        assert_eq!(errors.context()["attemptedPrice"], "-2.5");
    }

    #[test]
    fn non_finite_price_is_rejected() {
        let errors = field_errors(ProductRequest::new("a", "b", f64::NAN).validate().unwrap_err());
        assert!(errors.fields().contains_key("price"));
    }

    #[test]
    fn new_record_has_no_id_and_equal_timestamps() {
        let valid = ProductRequest::new("a", "b", 1.0).validate().unwrap();
        let product = Product::new(valid, test_time());
        assert!(product.is_new());
        assert_eq!(product.created_at(), product.updated_at());
    }

    #[test]
    fn assigned_id_is_never_replaced() {
        let valid = ProductRequest::new("a", "b", 1.0).validate().unwrap();
        let product = Product::new(valid, test_time())
            .with_assigned_id(ProductId::new(3))
            .with_assigned_id(ProductId::new(9));
        assert_eq!(product.id(), Some(ProductId::new(3)));
    }

    #[test]
    fn update_preserves_identity_and_creation_time() {
        let created = test_time();
        let valid = ProductRequest::new("a", "b", 1.0).validate().unwrap();
        let mut product = Product::new(valid, created).with_assigned_id(ProductId::new(1));

        let later = created + Duration::minutes(5);
        let changed = ProductRequest::new("c", "d", 5.0).validate().unwrap();
        product.apply_update(changed, later);

        assert_eq!(product.id(), Some(ProductId::new(1)));
        assert_eq!(product.created_at(), created);
        assert_eq!(product.updated_at(), later);
        assert_eq!(product.name(), "c");
        assert_eq!(product.price(), 5.0);
    }

    #[test]
    fn update_never_moves_updated_at_backwards() {
        let created = test_time();
        let valid = ProductRequest::new("a", "b", 1.0).validate().unwrap();
        let mut product = Product::new(valid.clone(), created);

        product.apply_update(valid, created - Duration::hours(1));
        assert_eq!(product.updated_at(), created);
    }

    #[test]
    fn serializes_in_camel_case() {
        let valid = ProductRequest::new("a", "b", 10.99).validate().unwrap();
        let product = Product::new(valid, test_time()).with_assigned_id(ProductId::new(7));
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["price"], 10.99);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }

    #[test]
    fn request_fields_default_to_none() {
        let request: ProductRequest = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert_eq!(request.name.as_deref(), Some("x"));
        assert!(request.description.is_none());
        assert!(request.price.is_none());
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: any non-blank name/description with a non-negative price validates unchanged.
            #[test]
            fn well_formed_requests_validate(
                name in "[A-Za-z][A-Za-z0-9 ]{0,40}",
                description in "[A-Za-z][A-Za-z0-9 ]{0,80}",
                price in 0.0f64..1_000_000.0
            ) {
                let valid = ProductRequest::new(name.clone(), description.clone(), price)
                    .validate()
                    .unwrap();
                prop_assert_eq!(valid.name(), name.as_str());
                prop_assert_eq!(valid.description(), description.as_str());
                prop_assert_eq!(valid.price(), price);
            }

            /// Property: a negative price is always rejected on the price field.
            #[test]
            fn negative_prices_always_fail(price in -1_000_000.0f64..-0.0001) {
                let err = ProductRequest::new("a", "b", price).validate().unwrap_err();
                let errors = field_errors(err);
                prop_assert_eq!(errors.field_names(), vec!["price"]);
            }

            /// Property: updates keep created_at and never decrease updated_at.
            #[test]
            fn updates_are_monotonic(offset_secs in -3600i64..3600) {
                let created = test_time();
                let valid = ProductRequest::new("a", "b", 1.0).validate().unwrap();
                let mut product = Product::new(valid.clone(), created);
                let before = product.updated_at();

                product.apply_update(valid, created + Duration::seconds(offset_secs));

                prop_assert_eq!(product.created_at(), created);
                prop_assert!(product.updated_at() >= before);
                prop_assert!(product.updated_at() >= product.created_at());
            }
        }
    }
}
