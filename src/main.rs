//! Catalog API Server
//! Mission: Product catalog with JWT auth and admin-gated mutations

use anyhow::{Context, Result};
use catalog_backend::{
    auth::{JwtHandler, UserStore},
    build_router,
    catalog::{ImageStore, ProductStore},
};
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use std::{env, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    info!("🛍️  Catalog API starting");

    let db_path = resolve_data_path(env::var("DB_PATH").ok(), "catalog.db");
    let upload_dir = resolve_data_path(env::var("UPLOAD_DIR").ok(), "uploads");
    let jwt_secret = env::var("JWT_SECRET")
        .unwrap_or_else(|_| "dev-secret-change-in-production-minimum-32-characters".to_string());
    let admin_password = env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

    let users = Arc::new(UserStore::new(&db_path)?);
    let products = Arc::new(ProductStore::new(&db_path)?);
    let images = Arc::new(ImageStore::new(&upload_dir)?);
    let jwt = Arc::new(JwtHandler::new(jwt_secret));

    // Bootstrap: the admin account must exist before traffic is accepted
    users.ensure_admin(&admin_password)?;

    info!("📊 Database initialized at: {}", db_path);
    info!("🖼️  Upload directory: {}", upload_dir);

    let app = build_router(users, products, images, jwt);

    let addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = TcpListener::bind(&addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_data_path(filename: &str) -> String {
    // Anchor defaults to the crate directory so running from elsewhere
    // doesn't create a fresh empty DB in a different working directory.
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    base.join(filename).to_string_lossy().to_string()
}

fn resolve_data_path(env_value: Option<String>, default_filename: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let Some(raw) = env_value.filter(|v| !v.trim().is_empty()) else {
        return default_data_path(default_filename);
    };

    let p = PathBuf::from(raw);
    if p.is_absolute() {
        return p.to_string_lossy().to_string();
    }

    // Treat relative paths as relative to the crate dir, not the caller's cwd.
    base.join(p).to_string_lossy().to_string()
}

fn load_env() {
    // Standard dotenv search (cwd + parents), then the crate-local .env
    let _ = dotenv();

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let local = manifest_dir.join(".env");
    if local.exists() {
        let _ = dotenv::from_path(&local);
    }
}
