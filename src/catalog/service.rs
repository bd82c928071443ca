//! Catalog service
//!
//! The one operation the UI layer sees: fetch the full catalog, resolve every
//! thumbnail, and publish the batch sorted by id.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::ServiceConfig;
use crate::error::{FetchError, Result};
use crate::{log_error, log_info};
use crate::transport::{ReqwestTransport, Transport};

use super::events::{CatalogEvent, EventSink};
use super::fetcher::CatalogFetcher;
use super::models::CatalogItem;
use super::resolver::ImageResolver;

const MODULE: &str = "catalog";

/// Fetches and assembles catalog batches over an injected [`Transport`]
pub struct CatalogService<T> {
    fetcher: CatalogFetcher<T>,
    resolver: ImageResolver<T>,
    events: EventSink,
}

impl CatalogService<ReqwestTransport> {
    /// Service talking to the real network
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Ok(Self::new(ReqwestTransport::new(config)?, config))
    }
}

impl<T: Transport> CatalogService<T> {
    pub fn new(transport: T, config: &ServiceConfig) -> Self {
        let transport = Arc::new(transport);
        Self {
            fetcher: CatalogFetcher::new(Arc::clone(&transport), config),
            resolver: ImageResolver::new(transport, config),
            events: EventSink::default(),
        }
    }

    /// Report progress of every fetch on `sender`
    pub fn with_events(mut self, sender: mpsc::UnboundedSender<CatalogEvent>) -> Self {
        self.events = EventSink::new(sender);
        self
    }

    /// Fetch the catalog and all thumbnails
    ///
    /// Catalog failures end the call with that error. Thumbnail failures only
    /// leave the affected items without an image. When `cancel` fires, every
    /// in-flight request is dropped and [`FetchError::Cancelled`] is returned.
    pub async fn fetch_full_catalog(&self, cancel: &CancellationToken) -> Result<Vec<CatalogItem>> {
        let items = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            items = self.fetcher.fetch_catalog() => items?,
        };
        self.events.emit(CatalogEvent::CatalogLoaded { count: items.len() });

        let items = self
            .resolver
            .resolve_with_events(items, cancel, &self.events)
            .await?;

        let missing_images = items.iter().filter(|item| !item.has_image()).count();
        log_info!(
            MODULE,
            "Publishing {} items ({} without image)",
            items.len(),
            missing_images
        );
        self.events.emit(CatalogEvent::Published {
            count: items.len(),
            missing_images,
        });
        Ok(items)
    }

    /// Run [`Self::fetch_full_catalog`] in the background
    ///
    /// The batch is handed to whoever awaits [`CatalogTask::wait`].
    pub fn spawn(self: Arc<Self>) -> CatalogTask {
        let cancel = CancellationToken::new();
        let (tx, rx) = oneshot::channel();

        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let result = self.fetch_full_catalog(&token).await;
            let _ = tx.send(result);
        });

        CatalogTask {
            cancel,
            result: rx,
            handle,
        }
    }
}

/// Handle to a background catalog fetch
///
/// Dropping the handle cancels the fetch.
pub struct CatalogTask {
    cancel: CancellationToken,
    result: oneshot::Receiver<Result<Vec<CatalogItem>>>,
    handle: JoinHandle<()>,
}

impl CatalogTask {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this fetch, e.g. for a signal handler
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the published batch
    ///
    /// A panic in the fetch task is reported as [`FetchError::TaskFailed`].
    pub async fn wait(mut self) -> Result<Vec<CatalogItem>> {
        if let Ok(result) = (&mut self.result).await {
            return result;
        }

        match (&mut self.handle).await {
            Err(e) if e.is_panic() => {
                log_error!(MODULE, "Catalog task panicked: {}", e);
                Err(FetchError::TaskFailed(e.to_string()))
            }
            _ => Err(FetchError::Cancelled),
        }
    }
}

impl Drop for CatalogTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
