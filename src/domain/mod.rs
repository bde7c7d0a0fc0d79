//! Domain types and models

pub mod catalog;

pub use catalog::{Catalog, CatalogError, Item};
