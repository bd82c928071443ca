//! Progress events emitted while a batch is assembled

use tokio::sync::mpsc::UnboundedSender;

/// Observer notification for one fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    /// Catalog list decoded, thumbnails about to be fetched
    CatalogLoaded { count: usize },
    ImageResolved { id: i64 },
    /// The item keeps no image; `reason` is the error text
    ImageFailed { id: i64, reason: String },
    /// Sent once, after every image event of the batch
    Published { count: usize, missing_images: usize },
}

/// Optional event sink; a dropped receiver is ignored
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink(Option<UnboundedSender<CatalogEvent>>);

impl EventSink {
    pub(crate) fn new(sender: UnboundedSender<CatalogEvent>) -> Self {
        Self(Some(sender))
    }

    pub(crate) fn emit(&self, event: CatalogEvent) {
        if let Some(ref sender) = self.0 {
            let _ = sender.send(event);
        }
    }
}
