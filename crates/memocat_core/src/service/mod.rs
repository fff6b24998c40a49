//! Use-case services validating domain invariants above repositories.

pub mod catalog_service;

pub use catalog_service::{CatalogService, CatalogServiceError, ChildListing};
