//! Product catalog types.

use rust_decimal::Decimal;
use serde::Serialize;

use luxe_scent_core::{ProductCategory, ProductId};

/// A catalog product.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub description: String,
    pub price: Decimal,
    /// Pre-discount price, shown struck through by the storefront.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_price: Option<Decimal>,
    pub image: String,
    pub category: ProductCategory,
    pub stock: i32,
    pub featured: bool,
}

/// Catalog listing filters, all optional.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub category: Option<ProductCategory>,
    pub brand: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Case-insensitive substring over name, brand, and description.
    pub search: Option<String>,
    pub featured: Option<bool>,
    /// Maximum number of products returned.
    pub limit: usize,
}

impl ProductFilter {
    /// Default listing limit.
    pub const DEFAULT_LIMIT: usize = 50;

    /// Whether a product passes every set filter.
    #[must_use]
    pub fn accepts(&self, product: &Product) -> bool {
        if let Some(category) = self.category
            && product.category != category
        {
            return false;
        }
        if let Some(brand) = &self.brand
            && &product.brand != brand
        {
            return false;
        }
        if let Some(min) = self.min_price
            && product.price < min
        {
            return false;
        }
        if let Some(max) = self.max_price
            && product.price > max
        {
            return false;
        }
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let matched = product.name.to_lowercase().contains(&term)
                || product.brand.to_lowercase().contains(&term)
                || product.description.to_lowercase().contains(&term);
            if !matched {
                return false;
            }
        }
        if let Some(featured) = self.featured
            && product.featured != featured
        {
            return false;
        }
        true
    }
}
