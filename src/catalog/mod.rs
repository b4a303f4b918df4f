//! Product Catalog Module
//! Mission: Product records, image assets, and CRUD + search over both

pub mod api;
pub mod images;
pub mod models;
pub mod store;

pub use api::CatalogState;
pub use images::ImageStore;
pub use store::ProductStore;
