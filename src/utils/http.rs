//! HTTP client utilities
//!
//! Provides centralized HTTP client creation with consistent configuration.

use reqwest::Client;

use crate::config::{self, ServiceConfig};
use crate::error::{FetchError, Result};

/// Create the shared HTTP client
///
/// Only the connect timeout is set here. Request timeouts differ between the
/// catalog and thumbnails, so they are applied per request.
pub fn create_client(settings: &ServiceConfig) -> Result<Client> {
    Client::builder()
        .user_agent(config::app::USER_AGENT)
        .connect_timeout(settings.connect_timeout)
        .redirect(reqwest::redirect::Policy::limited(config::http::MAX_REDIRECTS))
        .build()
        .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        let client = create_client(&ServiceConfig::default());
        assert!(client.is_ok());
    }
}
