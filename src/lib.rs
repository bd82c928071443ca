//! Pokedex - Pokemon catalog core
//!
//! Downloads the Pokemon catalog, repairs and decodes it, fetches every
//! thumbnail concurrently and publishes the assembled batch sorted by id.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod transport;
mod utils;

pub use catalog::{CatalogEvent, CatalogItem, CatalogService, CatalogTask, ItemImage};
pub use config::ServiceConfig;
pub use error::{FetchError, Result};
pub use transport::{HttpResponse, ReqwestTransport, Transport};
