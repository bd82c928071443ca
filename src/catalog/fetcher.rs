//! Catalog list fetching
//!
//! One GET for the catalog, repair of the `null,` filler the endpoint emits,
//! then decoding into [`CatalogItem`]s.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{self, ServiceConfig};
use crate::error::{FetchError, Result};
use crate::transport::Transport;
use crate::{log_error, log_info};

use super::models::CatalogItem;

const MODULE: &str = "fetcher";

/// Remove every literal `null,` from a catalog body
pub fn strip_null_filler(body: &str) -> String {
    body.replace(config::catalog::NULL_FILLER, "")
}

/// Repair and decode a raw catalog body
///
/// Items come back in server order with no images. Duplicate ids are
/// rejected since the id is the batch key.
pub fn decode_catalog(body: &[u8]) -> Result<Vec<CatalogItem>> {
    let text = std::str::from_utf8(body)
        .map_err(|e| FetchError::Decode(format!("body is not UTF-8: {}", e)))?;
    let repaired = strip_null_filler(text);

    let items: Vec<CatalogItem> =
        serde_json::from_str(&repaired).map_err(|e| FetchError::Decode(e.to_string()))?;

    let mut seen = HashSet::with_capacity(items.len());
    if let Some(dup) = items.iter().find(|item| !seen.insert(item.id)) {
        return Err(FetchError::Decode(format!("duplicate id {}", dup.id)));
    }

    Ok(items)
}

/// Fetches the catalog list from the configured endpoint
pub struct CatalogFetcher<T> {
    transport: Arc<T>,
    url: String,
    timeout: Duration,
    max_bytes: usize,
}

impl<T: Transport> CatalogFetcher<T> {
    pub fn new(transport: Arc<T>, config: &ServiceConfig) -> Self {
        Self {
            transport,
            url: config.catalog_url.clone(),
            timeout: config.request_timeout,
            max_bytes: config.max_catalog_bytes,
        }
    }

    /// Fetch and decode the catalog. Any failure ends the fetch; nothing is retried.
    pub async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>> {
        log_info!(MODULE, "Fetching catalog from {}", self.url);

        let request = self.transport.get(&self.url, self.max_bytes);
        let response = match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                log_error!(MODULE, "Failed to fetch catalog: {}", e);
                return Err(e);
            }
            Err(_) => {
                log_error!(MODULE, "Catalog request timed out after {:?}", self.timeout);
                return Err(FetchError::TimedOut(self.timeout));
            }
        };

        let body = response.into_body().map_err(|e| {
            log_error!(MODULE, "Catalog request rejected: {}", e);
            e
        })?;

        let items = decode_catalog(&body).map_err(|e| {
            log_error!(MODULE, "{}", e);
            e
        })?;

        log_info!(MODULE, "Decoded {} catalog items", items.len());
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;
    use assert_matches::assert_matches;

    fn record(id: i64, name: &str) -> String {
        format!(
            r#"{{"id":{id},"name":"{name}","type":"grass","description":"{name} desc","imageUrl":"http://img.test/{id}.png","attack":{a},"defense":{d},"height":{h},"weight":{w}}}"#,
            id = id,
            name = name,
            a = id * 10,
            d = id * 11,
            h = id + 1,
            w = id + 2
        )
    }

    /// Serves one canned catalog response
    struct CannedTransport {
        response: Result<HttpResponse>,
        delay: Duration,
    }

    impl Transport for CannedTransport {
        async fn get(&self, _url: &str, _max_bytes: usize) -> Result<HttpResponse> {
            tokio::time::sleep(self.delay).await;
            self.response.clone()
        }
    }

    fn fetcher(response: Result<HttpResponse>) -> CatalogFetcher<CannedTransport> {
        fetcher_with_delay(response, Duration::ZERO)
    }

    fn fetcher_with_delay(
        response: Result<HttpResponse>,
        delay: Duration,
    ) -> CatalogFetcher<CannedTransport> {
        let config = ServiceConfig {
            request_timeout: Duration::from_millis(200),
            ..ServiceConfig::default()
        };
        CatalogFetcher::new(Arc::new(CannedTransport { response, delay }), &config)
    }

    #[test]
    fn test_strip_is_identity_on_clean_input() {
        let clean = format!("[{},{}]", record(1, "bulbasaur"), record(2, "ivysaur"));
        assert_eq!(strip_null_filler(&clean), clean);
        assert_eq!(strip_null_filler(&strip_null_filler(&clean)), clean);
    }

    #[test]
    fn test_strip_removes_every_filler() {
        assert_eq!(strip_null_filler("[null,null,{},null,{}]"), "[{},{}]");
    }

    #[test]
    fn test_decode_maps_positionally() {
        let names = ["bulbasaur", "ivysaur", "venusaur", "charmander"];
        let ids = [4, 1, 3, 2];
        let body = format!(
            "[{}]",
            ids.iter()
                .zip(names.iter())
                .map(|(id, name)| record(*id, name))
                .collect::<Vec<_>>()
                .join(",")
        );

        let items = decode_catalog(body.as_bytes()).unwrap();
        assert_eq!(items.len(), names.len());
        for ((item, id), name) in items.iter().zip(ids).zip(names) {
            assert_eq!(item.id, id);
            assert_eq!(item.name, name);
            assert_eq!(item.attack_stat, id * 10);
            assert_eq!(item.defense_stat, id * 11);
            assert_eq!(item.image_ref, format!("http://img.test/{}.png", id));
            assert!(item.image.is_none());
        }
    }

    #[test]
    fn test_decode_repairs_stray_null() {
        let body = format!("[{},null,{}]", record(1, "bulbasaur"), record(2, "ivysaur"));
        let items = decode_catalog(body.as_bytes()).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| item.image.is_none()));
    }

    #[test]
    fn test_decode_repairs_leading_null() {
        let body = format!("[null,{}]", record(1, "bulbasaur"));
        assert_eq!(decode_catalog(body.as_bytes()).unwrap().len(), 1);
    }

    #[test]
    fn test_decode_failures() {
        assert_matches!(decode_catalog(b"{\"id\": 1}"), Err(FetchError::Decode(_)));
        assert_matches!(decode_catalog(b"[{\"id\": 1}]"), Err(FetchError::Decode(_)));
        assert_matches!(decode_catalog(&[0xff, 0xfe, b'[']), Err(FetchError::Decode(_)));
    }

    #[test]
    fn test_decode_rejects_duplicate_ids() {
        let body = format!("[{},{}]", record(7, "a"), record(7, "b"));
        assert_matches!(
            decode_catalog(body.as_bytes()),
            Err(FetchError::Decode(msg)) if msg.contains("duplicate id 7")
        );
    }

    #[test]
    fn test_decode_empty_array() {
        assert_eq!(decode_catalog(b"[]").unwrap(), Vec::new());
    }

    #[tokio::test]
    async fn test_fetch_success_keeps_server_order() {
        let body = format!("[{},{}]", record(9, "b"), record(3, "a"));
        let items = fetcher(Ok(HttpResponse::ok(body))).fetch_catalog().await.unwrap();
        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![9, 3]);
    }

    #[tokio::test]
    async fn test_fetch_bad_status() {
        let result = fetcher(Ok(HttpResponse::status(500))).fetch_catalog().await;
        assert_matches!(result, Err(FetchError::BadStatus(500)));
    }

    #[tokio::test]
    async fn test_fetch_network_failure() {
        let result = fetcher(Err(FetchError::Network("connection refused".into())))
            .fetch_catalog()
            .await;
        assert_matches!(result, Err(FetchError::Network(_)));
    }

    #[tokio::test]
    async fn test_fetch_decode_failure() {
        let result = fetcher(Ok(HttpResponse::ok("<html>oops</html>")))
            .fetch_catalog()
            .await;
        assert_matches!(result, Err(FetchError::Decode(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_times_out() {
        let result = fetcher_with_delay(Ok(HttpResponse::ok("[]")), Duration::from_secs(60))
            .fetch_catalog()
            .await;
        assert_matches!(result, Err(FetchError::TimedOut(_)));
    }
}
