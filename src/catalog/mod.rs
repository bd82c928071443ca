//! Catalog module
//!
//! Fetching, assembling and searching the Pokemon catalog.

mod events;
mod fetcher;
mod filters;
mod models;
mod resolver;
mod service;

#[cfg(test)]
mod testing;

pub use events::CatalogEvent;
pub use fetcher::{decode_catalog, strip_null_filler, CatalogFetcher};
pub use filters::{display_name, filter_by_name, find_by_id};
pub use models::{CatalogItem, ItemImage};
pub use resolver::ImageResolver;
pub use service::{CatalogService, CatalogTask};
