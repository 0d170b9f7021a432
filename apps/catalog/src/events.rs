//! # Event Bus
//!
//! The one channel the presentation layer listens on. Every state change
//! the UI has to reflect is published here as a [`CatalogEvent`].
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  commands / notification timers / preview tasks                        │
//! │         │ publish(CatalogEvent)                                         │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────┐                                      │
//! │  │  broadcast::Sender (cap 256) │                                      │
//! │  └──────────────┬───────────────┘                                      │
//! │        ┌────────┴────────┐                                              │
//! │        ▼                 ▼                                              │
//! │   JSON driver       tests / other subscribers                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Publishing with nobody subscribed is fine; the event is dropped.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;
use uuid::Uuid;

use catalog_core::{Field, Notification, Product, RenderView};

/// Buffered events per subscriber before it starts lagging.
const EVENT_CAPACITY: usize = 256;

/// Everything the UI can be told about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum CatalogEvent {
    /// A field was (re)validated; carries the updated flag and verdict.
    #[serde(rename_all = "camelCase")]
    FieldValidated { field: Field },

    /// The products table must show this view.
    #[serde(rename_all = "camelCase")]
    RowsRendered {
        query: Option<String>,
        view: RenderView,
    },

    /// A product was appended to the store.
    #[serde(rename_all = "camelCase")]
    ProductAdded { product: Product },

    /// The form was cleared after a successful submission.
    FormReset,

    /// Live price-with-tax for the total field.
    #[serde(rename_all = "camelCase")]
    TotalPreviewed { price: String, total: String },

    /// A banner appeared.
    #[serde(rename_all = "camelCase")]
    NotificationShown { notification: Notification },

    /// A banner timed out or was dismissed.
    #[serde(rename_all = "camelCase")]
    NotificationExpired { id: Uuid },

    /// The newest selected image finished loading.
    #[serde(rename_all = "camelCase")]
    PreviewReady { generation: u64, data_uri: String },

    /// The preview area was emptied.
    #[serde(rename_all = "camelCase")]
    PreviewCleared { generation: u64 },

    /// The picture of table row `id` finished loading.
    #[serde(rename_all = "camelCase")]
    RowPreviewReady { id: u64, data_uri: String },
}

/// Cheap-to-clone handle to the broadcast channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CatalogEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        EventBus { tx }
    }

    /// Sends an event to every current subscriber.
    pub fn publish(&self, event: CatalogEvent) {
        trace!(?event, "Publishing event");
        // Err only means there are no receivers right now
        let _ = self.tx.send(event);
    }

    /// Starts receiving events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
