//! # Domain Types
//!
//! Core domain types used throughout the catalog.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   RenderRow     │   │  Notification   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (u64, seq)  │──►│  name, barcode  │   │  id (UUID)      │       │
//! │  │  name, barcode  │   │  ... total      │   │  message        │       │
//! │  │  price, total   │   │  image, when    │   │  severity       │       │
//! │  │  timestamp      │   └─────────────────┘   └─────────────────┘       │
//! │  │  image?         │                                                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

// =============================================================================
// Image Attachment
// =============================================================================

/// An opaque reference to the file picked in the image input.
///
/// The core never reads the file; the app layer resolves `path` when it
/// builds a preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttachment {
    /// Where the presentation layer says the file lives.
    pub path: String,
}

impl ImageAttachment {
    pub fn new(path: impl Into<String>) -> Self {
        ImageAttachment { path: path.into() }
    }

    /// Final path component, used as the row placeholder.
    pub fn file_name(&self) -> &str {
        self.path
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .unwrap_or(&self.path)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog entry, created once by a successful submission.
///
/// Products are immutable after creation and owned by the
/// [`ProductStore`](crate::store::ProductStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Sequential identity, starting at 0, never reused.
    pub id: u64,

    /// Display name; the search field matches against this.
    pub name: String,

    pub barcode: String,

    pub description: String,

    /// Product kind as chosen in the form.
    pub kind: String,

    /// Raw price exactly as typed.
    pub price: String,

    /// Price with tax, two decimals, or empty if the price is not numeric.
    pub total: String,

    /// When the product was created.
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,

    /// Attached picture, if one was chosen.
    pub image: Option<ImageAttachment>,
}

// =============================================================================
// Render Rows
// =============================================================================

/// Number of columns in the products table.
pub const TABLE_COLUMNS: u8 = 8;

/// The display-ready projection of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RenderRow {
    pub id: u64,
    pub name: String,
    pub barcode: String,
    pub description: String,
    pub kind: String,
    pub price: String,
    pub total: String,
    /// Placeholder for the preview image; the attachment's file name or
    /// empty. The picture itself arrives later as a `rowPreviewReady`
    /// event carrying this row's `id`.
    pub image: String,
    /// Human readable creation time.
    pub timestamp: String,
}

/// Output of one filter/render pass.
///
/// An empty result is a single sentinel row spanning the table, never
/// zero rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderView {
    Rows { rows: Vec<RenderRow> },
    Empty { message: String, colspan: u8 },
}

impl RenderView {
    /// Number of table rows this view occupies (1 for the sentinel).
    pub fn row_count(&self) -> usize {
        match self {
            RenderView::Rows { rows } => rows.len(),
            RenderView::Empty { .. } => 1,
        }
    }

    /// The product rows, empty for the sentinel.
    pub fn rows(&self) -> &[RenderRow] {
        match self {
            RenderView::Rows { rows } => rows,
            RenderView::Empty { .. } => &[],
        }
    }

    /// True if this is the "no results" sentinel.
    pub fn is_empty_state(&self) -> bool {
        matches!(self, RenderView::Empty { .. })
    }
}

// =============================================================================
// Notifications
// =============================================================================

/// Banner style of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Danger,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Danger => write!(f, "danger"),
        }
    }
}

/// A short-lived banner message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[ts(as = "String")]
    pub id: Uuid,
    pub message: String,
    pub severity: Severity,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity, created_at: DateTime<Utc>) -> Self {
        Notification {
            id: Uuid::new_v4(),
            message: message.into(),
            severity,
            created_at,
        }
    }

    pub fn success(message: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Notification::new(message, Severity::Success, created_at)
    }

    pub fn danger(message: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Notification::new(message, Severity::Danger, created_at)
    }
}
