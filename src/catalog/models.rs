//! Product Catalog Models
//! Mission: Define product records and their request/response shapes

use serde::{Deserialize, Serialize};

/// A catalog entry with descriptive and inventory fields plus an image
/// reference. Sizes and colors are stored as comma-delimited token lists
/// ("S,M,L" / "red,blue").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub sizes: String,
    pub colors: String,
    pub category: String,
    pub stock: i64,
    pub image_url: String,
}

/// Fields for a new product; the image is persisted separately and its
/// public path recorded in `image_url` before insertion.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub sizes: String,
    pub colors: String,
    pub category: String,
    pub stock: i64,
    pub image_url: String,
}

impl NewProduct {
    /// Validate field constraints before persisting
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("price must be a non-negative number".to_string());
        }
        if self.stock < 0 {
            return Err("stock must be a non-negative integer".to_string());
        }
        Ok(())
    }
}

/// Explicit partial update: `Some` overwrites the stored value, `None`
/// leaves it unchanged. Each field is applied by name; no reflection.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub sizes: Option<String>,
    pub colors: Option<String>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub image_url: Option<String>,
}

impl ProductUpdate {
    /// Merge the provided fields onto an existing product
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(sizes) = &self.sizes {
            product.sizes = sizes.clone();
        }
        if let Some(colors) = &self.colors {
            product.colors = colors.clone();
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(image_url) = &self.image_url {
            product.image_url = image_url.clone();
        }
    }

    /// Validate the fields that are present
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err("name must not be empty".to_string());
            }
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                return Err("price must be a non-negative number".to_string());
            }
        }
        if let Some(stock) = self.stock {
            if stock < 0 {
                return Err("stock must be a non-negative integer".to_string());
            }
        }
        Ok(())
    }
}

/// Pagination query for GET /products/
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Filter query for GET /search/
///
/// Each provided filter is a case-insensitive substring match; filters AND
/// together and pagination applies once to the combined result.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

/// Response for GET /products/
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub count: usize,
    pub data: Vec<Product>,
}
