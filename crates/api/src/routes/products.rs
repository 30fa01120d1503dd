//! Public catalog endpoints.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use luxe_scent_core::{ProductCategory, ProductId};

use crate::error::{ApiError, Result};
use crate::models::{Product, ProductFilter};
use crate::state::AppState;

/// Catalog query parameters, all optional. Arrives as strings so malformed
/// values get a JSON 400 instead of axum's plain-text query rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub search: Option<String>,
    pub featured: Option<String>,
    pub limit: Option<String>,
}

impl ProductQuery {
    fn into_filter(self) -> Result<ProductFilter> {
        let category = self
            .category
            .as_deref()
            .map(ProductCategory::from_str)
            .transpose()
            .map_err(|e| ApiError::BadRequest(format!("Invalid category: {e}")))?;

        let parse_price = |field: Option<String>, name: &str| {
            field
                .as_deref()
                .map(Decimal::from_str)
                .transpose()
                .map_err(|_| ApiError::BadRequest(format!("Invalid {name}")))
        };
        let min_price = parse_price(self.min_price, "minPrice")?;
        let max_price = parse_price(self.max_price, "maxPrice")?;

        let featured = self
            .featured
            .as_deref()
            .map(str::parse::<bool>)
            .transpose()
            .map_err(|_| ApiError::BadRequest("Invalid featured flag".to_string()))?;

        let limit = self
            .limit
            .as_deref()
            .map(str::parse::<usize>)
            .transpose()
            .map_err(|_| ApiError::BadRequest("Invalid limit".to_string()))?
            .unwrap_or(ProductFilter::DEFAULT_LIMIT);

        Ok(ProductFilter {
            category,
            brand: self.brand,
            min_price,
            max_price,
            search: self.search,
            featured,
            limit,
        })
    }
}

/// List catalog products, optionally filtered.
///
/// GET /api/products
///
/// # Errors
///
/// Returns 400 for malformed filter values.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let filter = query.into_filter()?;
    let products = state.store().products(&filter).await?;
    Ok(Json(products))
}

/// A single product by ID.
///
/// GET /api/products/{id}
///
/// # Errors
///
/// Returns 404 for an unknown product.
pub async fn show(State(state): State<AppState>, Path(id): Path<i32>) -> Result<Json<Product>> {
    let product = state
        .store()
        .product_by_id(ProductId::new(id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;
    Ok(Json(product))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_uses_default_limit() {
        let filter = ProductQuery::default().into_filter().unwrap();
        assert_eq!(filter.limit, ProductFilter::DEFAULT_LIMIT);
        assert!(filter.category.is_none());
    }

    #[test]
    fn test_valid_query_parses() {
        let query = ProductQuery {
            category: Some("body-spray".to_string()),
            min_price: Some("10.50".to_string()),
            featured: Some("true".to_string()),
            limit: Some("5".to_string()),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.category, Some(ProductCategory::BodySpray));
        assert_eq!(filter.min_price, Some(Decimal::new(1050, 2)));
        assert_eq!(filter.featured, Some(true));
        assert_eq!(filter.limit, 5);
    }

    #[test]
    fn test_bad_values_rejected() {
        let query = ProductQuery {
            category: Some("soap".to_string()),
            ..Default::default()
        };
        assert!(query.into_filter().is_err());

        let query = ProductQuery {
            min_price: Some("cheap".to_string()),
            ..Default::default()
        };
        assert!(query.into_filter().is_err());
    }
}
