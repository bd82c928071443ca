//! Platform path utilities

use std::path::PathBuf;

/// Get the cache directory for the application
pub fn get_cache_dir(app_name: &str) -> PathBuf {
    dirs::cache_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join(app_name)
}
