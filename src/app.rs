//! Router Assembly
//! Mission: Wire endpoints, auth middleware, and static file serving

use crate::auth::{api as auth_api, auth_middleware, AuthState, JwtHandler, UserStore};
use crate::catalog::{api as catalog_api, CatalogState, ImageStore, ProductStore};
use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Build the full application router
///
/// Mutating product routes and user endpoints sit behind the JWT middleware;
/// browse/search, login, uploads, and health are public.
pub fn build_router(
    users: Arc<UserStore>,
    products: Arc<ProductStore>,
    images: Arc<ImageStore>,
    jwt: Arc<JwtHandler>,
) -> Router {
    let uploads_dir = images.dir().to_path_buf();

    let auth_state = AuthState::new(users.clone(), jwt.clone());
    let catalog_state = CatalogState::new(users, products, images);

    let login_routes = Router::new()
        .route("/token", post(auth_api::login))
        .with_state(auth_state.clone());

    let user_routes = Router::new()
        .route("/userme", get(auth_api::get_current_user))
        .route("/users", post(auth_api::create_user))
        .route_layer(middleware::from_fn_with_state(
            jwt.clone(),
            auth_middleware,
        ))
        .with_state(auth_state);

    let public_catalog = Router::new()
        .route("/products/", get(catalog_api::list_products))
        .route("/products/:id", get(catalog_api::get_product))
        .route("/search/", get(catalog_api::search_products))
        .route("/health", get(health_check))
        .with_state(catalog_state.clone());

    let admin_catalog = Router::new()
        .route("/products/", post(catalog_api::create_product))
        .route(
            "/products/:id",
            put(catalog_api::update_product).delete(catalog_api::delete_product),
        )
        .route_layer(middleware::from_fn_with_state(jwt, auth_middleware))
        .with_state(catalog_state);

    Router::new()
        .merge(login_routes)
        .merge(user_routes)
        .merge(public_catalog)
        .merge(admin_catalog)
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
