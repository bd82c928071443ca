//! Thumbnail resolution
//!
//! Fetches one thumbnail per catalog item concurrently and joins every fetch
//! before handing the batch back. A failed thumbnail only leaves its own
//! item without an image.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::ServiceConfig;
use crate::error::{FetchError, Result};
use crate::transport::Transport;
use crate::{log_debug, log_error, log_info, log_warn};

use super::events::{CatalogEvent, EventSink};
use super::models::{CatalogItem, ItemImage};

const MODULE: &str = "resolver";

/// Fetches thumbnails for a decoded catalog
pub struct ImageResolver<T> {
    transport: Arc<T>,
    timeout: Duration,
    max_bytes: usize,
    max_concurrent: usize,
}

impl<T: Transport> ImageResolver<T> {
    pub fn new(transport: Arc<T>, config: &ServiceConfig) -> Self {
        Self {
            transport,
            timeout: config.image_timeout,
            max_bytes: config.max_image_bytes,
            max_concurrent: config.max_concurrent_images.max(1),
        }
    }

    /// Fetch every item's thumbnail and return the items sorted by id
    ///
    /// Returns only after every fetch has succeeded or failed. The only error
    /// is [`FetchError::Cancelled`], in which case all in-flight fetches have
    /// been aborted before returning.
    pub async fn resolve_images(
        &self,
        items: Vec<CatalogItem>,
        cancel: &CancellationToken,
    ) -> Result<Vec<CatalogItem>> {
        self.resolve_with_events(items, cancel, &EventSink::default())
            .await
    }

    pub(crate) async fn resolve_with_events(
        &self,
        mut items: Vec<CatalogItem>,
        cancel: &CancellationToken,
        events: &EventSink,
    ) -> Result<Vec<CatalogItem>> {
        let total = items.len();
        log_info!(
            MODULE,
            "Resolving {} images ({} at a time)",
            total,
            self.max_concurrent
        );

        let permits = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();
        let mut task_slots = HashMap::with_capacity(total);

        for (index, item) in items.iter().enumerate() {
            let transport = Arc::clone(&self.transport);
            let permits = Arc::clone(&permits);
            let url = item.image_ref.clone();
            let (timeout, max_bytes) = (self.timeout, self.max_bytes);

            let handle = tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                let outcome = fetch_image(transport.as_ref(), &url, timeout, max_bytes).await;
                (index, outcome)
            });
            task_slots.insert(handle.id(), index);
        }

        let mut settled = 0;
        let mut resolved = 0;

        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                joined = tasks.join_next() => Some(joined),
            };

            let Some(joined) = joined else {
                log_warn!(
                    MODULE,
                    "Cancelled with {} of {} images settled",
                    settled,
                    total
                );
                tasks.shutdown().await;
                return Err(FetchError::Cancelled);
            };
            let Some(joined) = joined else {
                break;
            };
            settled += 1;

            match joined {
                Ok((index, Ok(image))) => {
                    let item = &mut items[index];
                    log_debug!(MODULE, "Image for #{} resolved ({})", item.id, image.summary());
                    item.image = Some(image);
                    resolved += 1;
                    events.emit(CatalogEvent::ImageResolved { id: item.id });
                }
                Ok((index, Err(e))) => {
                    let id = items[index].id;
                    log_warn!(MODULE, "Image for #{} unavailable: {}", id, e);
                    events.emit(CatalogEvent::ImageFailed {
                        id,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    log_error!(MODULE, "Image task failed: {}", e);
                    if let Some(&index) = task_slots.get(&e.id()) {
                        events.emit(CatalogEvent::ImageFailed {
                            id: items[index].id,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        debug_assert_eq!(settled, total);
        items.sort_by_key(|item| item.id);

        log_info!(
            MODULE,
            "Resolved {} of {} images ({} missing)",
            resolved,
            total,
            total - resolved
        );
        Ok(items)
    }
}

/// Fetch and validate a single thumbnail
async fn fetch_image<T: Transport>(
    transport: &T,
    url: &str,
    timeout: Duration,
    max_bytes: usize,
) -> Result<ItemImage> {
    let response = tokio::time::timeout(timeout, transport.get(url, max_bytes))
        .await
        .map_err(|_| FetchError::TimedOut(timeout))??;
    let body = response.into_body()?;

    tokio::task::spawn_blocking(move || ItemImage::decode(body))
        .await
        .map_err(|e| FetchError::InvalidImage(format!("image validation failed: {}", e)))?
}
