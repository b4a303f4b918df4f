//! Catalog Backend Library
//!
//! A small product-catalog web service: password login issuing signed bearer
//! tokens, admin-only product mutations with image upload, and public
//! browse/search. Exposed as a library so the binary and integration tests
//! share the router.

pub mod app;
pub mod auth;
pub mod catalog;

pub use app::build_router;
