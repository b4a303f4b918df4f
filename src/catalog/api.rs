//! Product Catalog API Endpoints
//! Mission: Public browse/search plus admin-only product mutations

use crate::auth::{
    api::{require_admin, AuthApiError},
    models::Claims,
    user_store::UserStore,
};
use crate::catalog::{
    images::ImageStore,
    models::{ListQuery, NewProduct, Product, ProductListResponse, ProductUpdate, SearchQuery},
    store::{ProductStore, DEFAULT_LIMIT, DEFAULT_SKIP},
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

/// Shared catalog state
#[derive(Clone)]
pub struct CatalogState {
    pub user_store: Arc<UserStore>,
    pub products: Arc<ProductStore>,
    pub images: Arc<ImageStore>,
}

impl CatalogState {
    pub fn new(
        user_store: Arc<UserStore>,
        products: Arc<ProductStore>,
        images: Arc<ImageStore>,
    ) -> Self {
        Self {
            user_store,
            products,
            images,
        }
    }
}

/// Multipart product form: text fields plus an optional image part
#[derive(Debug, Default)]
struct ProductForm {
    name: Option<String>,
    description: Option<String>,
    price: Option<f64>,
    sizes: Option<String>,
    colors: Option<String>,
    category: Option<String>,
    stock: Option<i64>,
    image: Option<(String, Vec<u8>)>,
}

async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm, ApiError> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("invalid multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "image" {
            let filename = field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| ApiError::Validation("image part missing a filename".to_string()))?;
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("failed to read image: {}", e)))?;
            form.image = Some((filename, bytes.to_vec()));
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| ApiError::Validation(format!("failed to read field {}: {}", name, e)))?;

        match name.as_str() {
            "name" => form.name = Some(text),
            "description" => form.description = Some(text),
            "sizes" => form.sizes = Some(text),
            "colors" => form.colors = Some(text),
            "category" => form.category = Some(text),
            "price" => {
                form.price = Some(text.parse::<f64>().map_err(|_| {
                    ApiError::Validation(format!("price is not a number: {:?}", text))
                })?);
            }
            "stock" => {
                form.stock = Some(text.parse::<i64>().map_err(|_| {
                    ApiError::Validation(format!("stock is not an integer: {:?}", text))
                })?);
            }
            _ => {} // unknown parts are ignored
        }
    }

    Ok(form)
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::Validation(format!("missing required field: {}", field)))
}

/// Create product - POST /products/ (admin only)
pub async fn create_product(
    State(state): State<CatalogState>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<Json<Product>, ApiError> {
    require_admin(&state.user_store, &claims)?;

    let form = read_product_form(multipart).await?;
    let (image_name, image_bytes) = required(form.image, "image")?;

    let mut new = NewProduct {
        name: required(form.name, "name")?,
        description: required(form.description, "description")?,
        price: required(form.price, "price")?,
        sizes: required(form.sizes, "sizes")?,
        colors: required(form.colors, "colors")?,
        category: required(form.category, "category")?,
        stock: required(form.stock, "stock")?,
        image_url: String::new(),
    };
    new.validate().map_err(ApiError::Validation)?;

    new.image_url = state
        .images
        .save(&image_name, &image_bytes)
        .map_err(|e| ApiError::Validation(format!("could not store image: {}", e)))?;

    let product = state.products.create(&new).map_err(internal)?;
    Ok(Json(product))
}

/// List products - GET /products/
pub async fn list_products(
    State(state): State<CatalogState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let skip = query.skip.unwrap_or(DEFAULT_SKIP).max(0);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).max(0);

    let (count, data) = state.products.list(skip, limit).map_err(internal)?;
    Ok(Json(ProductListResponse { count, data }))
}

/// Get product by id - GET /products/:id
pub async fn get_product(
    State(state): State<CatalogState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .products
        .get(id)
        .map_err(internal)?
        .ok_or(ApiError::ProductNotFound)?;
    Ok(Json(product))
}

/// Search products - GET /search/
pub async fn search_products(
    State(state): State<CatalogState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let skip = query.skip.unwrap_or(DEFAULT_SKIP).max(0);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).max(0);

    let products = state
        .products
        .search(
            skip,
            limit,
            query.name.as_deref(),
            query.description.as_deref(),
            query.category.as_deref(),
        )
        .map_err(internal)?;
    Ok(Json(products))
}

/// Update product - PUT /products/:product_id (admin only)
///
/// Multipart form with every field optional; a supplied image replaces the
/// stored `image_url` while the prior asset stays on disk.
pub async fn update_product(
    State(state): State<CatalogState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<Product>, ApiError> {
    require_admin(&state.user_store, &claims)?;

    let form = read_product_form(multipart).await?;

    let mut update = ProductUpdate {
        name: form.name,
        description: form.description,
        price: form.price,
        sizes: form.sizes,
        colors: form.colors,
        category: form.category,
        stock: form.stock,
        image_url: None,
    };
    update.validate().map_err(ApiError::Validation)?;

    if let Some((image_name, image_bytes)) = form.image {
        let url = state
            .images
            .save(&image_name, &image_bytes)
            .map_err(|e| ApiError::Validation(format!("could not store image: {}", e)))?;
        update.image_url = Some(url);
    }

    let product = state
        .products
        .update(product_id, &update)
        .map_err(internal)?
        .ok_or(ApiError::ProductNotFound)?;
    Ok(Json(product))
}

/// Delete product - DELETE /products/:product_id (admin only)
pub async fn delete_product(
    State(state): State<CatalogState>,
    Extension(claims): Extension<Claims>,
    Path(product_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&state.user_store, &claims)?;

    let deleted = state.products.delete(product_id).map_err(internal)?;
    if !deleted {
        return Err(ApiError::ProductNotFound);
    }

    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

fn internal(e: anyhow::Error) -> ApiError {
    warn!("catalog operation failed: {:#}", e);
    ApiError::InternalError
}

/// Catalog API errors
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Forbidden,
    UserNotFound,
    ProductNotFound,
    InternalError,
}

impl From<AuthApiError> for ApiError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::Forbidden => ApiError::Forbidden,
            AuthApiError::UserNotFound => ApiError::UserNotFound,
            _ => ApiError::InternalError,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Not enough permissions".to_string()),
            ApiError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            ApiError::ProductNotFound => (StatusCode::NOT_FOUND, "Product not found".to_string()),
            ApiError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_responses() {
        let validation = ApiError::Validation("bad".to_string()).into_response();
        assert_eq!(validation.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let forbidden = ApiError::Forbidden.into_response();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let not_found = ApiError::ProductNotFound.into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_auth_error_mapping() {
        assert!(matches!(
            ApiError::from(AuthApiError::Forbidden),
            ApiError::Forbidden
        ));
        assert!(matches!(
            ApiError::from(AuthApiError::UserNotFound),
            ApiError::UserNotFound
        ));
        assert!(matches!(
            ApiError::from(AuthApiError::InternalError),
            ApiError::InternalError
        ));
    }
}
