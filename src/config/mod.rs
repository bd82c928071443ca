//! Application configuration and constants
//!
//! Centralizes all hard-coded values, URLs, and configuration options,
//! plus the runtime [`ServiceConfig`] built from them.

use std::time::Duration;

use crate::log_warn;

/// Application metadata
pub mod app {
    /// Application name used for cache and log directories
    pub const NAME: &str = "pokedex";

    /// Application display name
    pub const DISPLAY_NAME: &str = "Pokedex";

    /// User agent for HTTP requests
    pub const USER_AGENT: &str = "Pokedex/1.0";
}

/// API endpoints and URLs
pub mod urls {
    /// Pokemon catalog JSON endpoint
    pub const CATALOG: &str = "https://pokedex-bb36f.firebaseio.com/pokemon.json";
}

/// HTTP client settings
pub mod http {
    /// Connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Catalog request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Per-image request timeout in seconds
    pub const IMAGE_TIMEOUT_SECS: u64 = 15;

    /// Maximum number of redirects followed
    pub const MAX_REDIRECTS: usize = 10;
}

/// Catalog assembly settings
pub mod catalog {
    /// Malformed filler emitted by the upstream endpoint, removed before decoding
    pub const NULL_FILLER: &str = "null,";

    /// Largest accepted catalog body (8 MB)
    pub const MAX_CATALOG_BYTES: usize = 8 * 1024 * 1024;

    /// Largest accepted thumbnail body (4 MB)
    pub const MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;

    /// Largest accepted thumbnail width or height in pixels
    pub const MAX_IMAGE_DIMENSION: u32 = 4096;

    /// Memory a single thumbnail decode may allocate (128 MB)
    pub const MAX_IMAGE_ALLOC: u64 = 128 * 1024 * 1024;

    /// Thumbnail requests allowed in flight at once
    pub const MAX_CONCURRENT_IMAGES: usize = 16;
}

/// Environment variables read by [`ServiceConfig::from_env`]
pub mod env {
    pub const CATALOG_URL: &str = "POKEDEX_CATALOG_URL";
    pub const REQUEST_TIMEOUT_SECS: &str = "POKEDEX_REQUEST_TIMEOUT_SECS";
    pub const IMAGE_TIMEOUT_SECS: &str = "POKEDEX_IMAGE_TIMEOUT_SECS";
    pub const MAX_CONCURRENT_IMAGES: &str = "POKEDEX_MAX_CONCURRENT_IMAGES";
}

/// Runtime settings for the catalog service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Endpoint returning the catalog JSON array
    pub catalog_url: String,
    /// Timeout for the catalog request
    pub request_timeout: Duration,
    /// Timeout for establishing any connection
    pub connect_timeout: Duration,
    /// Timeout applied to each thumbnail task
    pub image_timeout: Duration,
    pub max_catalog_bytes: usize,
    pub max_image_bytes: usize,
    /// Upper bound on concurrent thumbnail requests (at least 1)
    pub max_concurrent_images: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            catalog_url: urls::CATALOG.to_string(),
            request_timeout: Duration::from_secs(http::REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(http::CONNECT_TIMEOUT_SECS),
            image_timeout: Duration::from_secs(http::IMAGE_TIMEOUT_SECS),
            max_catalog_bytes: catalog::MAX_CATALOG_BYTES,
            max_image_bytes: catalog::MAX_IMAGE_BYTES,
            max_concurrent_images: catalog::MAX_CONCURRENT_IMAGES,
        }
    }
}

impl ServiceConfig {
    /// Build a config from defaults, overridden by `POKEDEX_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from defaults, overridden by whatever `lookup` returns
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(env::CATALOG_URL).filter(|u| !u.trim().is_empty()) {
            config.catalog_url = url.trim().to_string();
        }
        if let Some(timeout) = parse_timeout(&lookup, env::REQUEST_TIMEOUT_SECS) {
            config.request_timeout = timeout;
        }
        if let Some(timeout) = parse_timeout(&lookup, env::IMAGE_TIMEOUT_SECS) {
            config.image_timeout = timeout;
        }
        if let Some(limit) = parse_var::<usize, _>(&lookup, env::MAX_CONCURRENT_IMAGES) {
            config.max_concurrent_images = limit.max(1);
        }

        config
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log_warn!("config", "Ignoring invalid value for {}: {:?}", key, raw);
            None
        }
    }
}

/// Parse a timeout in whole seconds. Zero is rejected.
fn parse_timeout<F>(lookup: &F, key: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_var::<u64, _>(lookup, key)? {
        0 => {
            log_warn!("config", "Ignoring zero timeout for {}", key);
            None
        }
        secs => Some(Duration::from_secs(secs)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_uses_constants() {
        let config = ServiceConfig::default();
        assert_eq!(config.catalog_url, urls::CATALOG);
        assert_eq!(config.image_timeout, Duration::from_secs(http::IMAGE_TIMEOUT_SECS));
        assert_eq!(config.max_concurrent_images, catalog::MAX_CONCURRENT_IMAGES);
    }

    #[test]
    fn test_env_overrides() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            (env::CATALOG_URL, "http://localhost:9000/pokemon.json"),
            (env::IMAGE_TIMEOUT_SECS, "3"),
            (env::MAX_CONCURRENT_IMAGES, "0"),
        ]));
        assert_eq!(config.catalog_url, "http://localhost:9000/pokemon.json");
        assert_eq!(config.image_timeout, Duration::from_secs(3));
        assert_eq!(config.max_concurrent_images, 1);
    }

    #[test]
    fn test_invalid_values_are_ignored() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            (env::REQUEST_TIMEOUT_SECS, "soon"),
            (env::CATALOG_URL, "   "),
        ]));
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_zero_timeouts_are_ignored() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            (env::REQUEST_TIMEOUT_SECS, "0"),
            (env::IMAGE_TIMEOUT_SECS, " 0 "),
        ]));
        assert_eq!(config.request_timeout, ServiceConfig::default().request_timeout);
        assert_eq!(config.image_timeout, ServiceConfig::default().image_timeout);
    }
}
