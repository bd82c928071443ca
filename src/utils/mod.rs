//! Shared helpers

mod http;
mod system;

pub use http::create_client;
pub use system::get_cache_dir;
