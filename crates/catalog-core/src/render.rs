//! # Filter / Render Pipeline
//!
//! Derives the products table from the store and the search box.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Filter / Render                                      │
//! │                                                                         │
//! │  query: None | ""        query: "cola"                                  │
//! │        │                        │                                       │
//! │        ▼                        ▼                                       │
//! │  every product            products whose name contains "cola"          │
//! │  (insertion order)        (case-sensitive substring)                    │
//! │        └──────────┬─────────────┘                                       │
//! │                   ▼                                                     │
//! │         empty? ──yes──► RenderView::Empty (one full-width row)         │
//! │                   │                                                     │
//! │                   no                                                    │
//! │                   ▼                                                     │
//! │         RenderView::Rows (one RenderRow per product)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rendering never touches the store; the same query over the same store
//! always yields the same view.

use chrono::{DateTime, Utc};
use std::fmt::Write;
use tracing::debug;

use crate::store::ProductStore;
use crate::types::{ImageAttachment, Product, RenderRow, RenderView, TABLE_COLUMNS};
use crate::{DEFAULT_EMPTY_MESSAGE, DEFAULT_TIMESTAMP_FORMAT};

/// Presentation knobs for a render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// `chrono` strftime pattern for the timestamp column.
    pub timestamp_format: String,
    /// Text of the "no results" row.
    pub empty_message: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            empty_message: DEFAULT_EMPTY_MESSAGE.to_string(),
        }
    }
}

/// Selects the products matching `query`, in insertion order.
///
/// `None` and `""` both select everything.
pub fn filter<'a>(store: &'a ProductStore, query: Option<&str>) -> Vec<&'a Product> {
    match query.filter(|q| !q.is_empty()) {
        Some(q) => store
            .products()
            .iter()
            .filter(|p| p.name.contains(q))
            .collect(),
        None => store.products().iter().collect(),
    }
}

/// Formats a timestamp for display. `None` renders as empty.
///
/// An unusable pattern falls back to RFC 3339 instead of panicking.
pub fn format_timestamp(timestamp: Option<&DateTime<Utc>>, format: &str) -> String {
    let Some(ts) = timestamp else {
        return String::new();
    };

    let mut out = String::new();
    match write!(out, "{}", ts.format(format)) {
        Ok(()) => out,
        Err(_) => ts.to_rfc3339(),
    }
}

/// Attachments of the rows a pass over `query` shows, keyed by product id.
///
/// The app loads each of these into its row once the table is drawn.
pub fn row_images<'a>(store: &'a ProductStore, query: Option<&str>) -> Vec<(u64, &'a ImageAttachment)> {
    filter(store, query)
        .into_iter()
        .filter_map(|p| p.image.as_ref().map(|img| (p.id, img)))
        .collect()
}

/// Projects one product into a table row.
pub fn to_row(product: &Product, options: &RenderOptions) -> RenderRow {
    RenderRow {
        id: product.id,
        name: product.name.clone(),
        barcode: product.barcode.clone(),
        description: product.description.clone(),
        kind: product.kind.clone(),
        price: product.price.clone(),
        total: product.total.clone(),
        image: product
            .image
            .as_ref()
            .map(|img| img.file_name().to_string())
            .unwrap_or_default(),
        timestamp: format_timestamp(Some(&product.timestamp), &options.timestamp_format),
    }
}

/// Runs one filter/render pass.
///
/// ## Example
/// ```rust
/// use catalog_core::render::{render, RenderOptions};
/// use catalog_core::store::ProductStore;
///
/// let store = ProductStore::new();
/// let view = render(&store, None, &RenderOptions::default());
/// assert!(view.is_empty_state());
/// ```
pub fn render(store: &ProductStore, query: Option<&str>, options: &RenderOptions) -> RenderView {
    let matched = filter(store, query);
    debug!(query = query.unwrap_or(""), matches = matched.len(), "Filtered products by name");

    if matched.is_empty() {
        return RenderView::Empty {
            message: options.empty_message.clone(),
            colspan: TABLE_COLUMNS,
        };
    }

    RenderView::Rows {
        rows: matched.into_iter().map(|p| to_row(p, options)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NewProduct;
    use crate::types::ImageAttachment;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 14, 5, 9).unwrap()
    }

    fn store_with(names: &[&str]) -> ProductStore {
        let mut store = ProductStore::new();
        for name in names {
            store.append(
                NewProduct {
                    name: name.to_string(),
                    barcode: "4001".to_string(),
                    price: "10".to_string(),
                    total: "12.00".to_string(),
                    ..NewProduct::default()
                },
                at(),
            );
        }
        store
    }

    fn names(view: &RenderView) -> Vec<&str> {
        view.rows().iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_row_images_follow_the_filter() {
        let mut store = store_with(&["Milk"]);
        for (name, image) in [("Chocolate milk", Some("choc.png")), ("Bread", Some("bread.png"))] {
            store.append(
                NewProduct {
                    name: name.to_string(),
                    image: image.map(ImageAttachment::new),
                    ..NewProduct::default()
                },
                at(),
            );
        }

        let all: Vec<_> = row_images(&store, None)
            .into_iter()
            .map(|(id, img)| (id, img.path.as_str()))
            .collect();
        assert_eq!(all, vec![(1, "choc.png"), (2, "bread.png")]);

        let milk: Vec<u64> = row_images(&store, Some("milk")).into_iter().map(|(id, _)| id).collect();
        assert_eq!(milk, vec![1]);
        assert!(row_images(&store, Some("Tea")).is_empty());
    }

    #[test]
    fn test_no_query_returns_everything_in_order() {
        let store = store_with(&["Milk", "Bread", "Chocolate milk"]);
        let options = RenderOptions::default();

        let all = render(&store, None, &options);
        assert_eq!(names(&all), vec!["Milk", "Bread", "Chocolate milk"]);
        assert_eq!(render(&store, Some(""), &options), all);
    }

    #[test]
    fn test_query_is_case_sensitive_substring() {
        let store = store_with(&["Milk", "Bread", "Chocolate milk"]);
        let options = RenderOptions::default();

        assert_eq!(names(&render(&store, Some("ilk"), &options)), vec!["Milk", "Chocolate milk"]);
        assert_eq!(names(&render(&store, Some("Milk"), &options)), vec!["Milk"]);
        assert_eq!(names(&render(&store, Some("milk"), &options)), vec!["Chocolate milk"]);
    }

    #[test]
    fn test_no_match_yields_sentinel_row() {
        let store = store_with(&["Milk"]);
        let view = render(&store, Some("Tea"), &RenderOptions::default());
        assert_eq!(
            view,
            RenderView::Empty {
                message: "Nepostojeci prozivod".to_string(),
                colspan: 8,
            }
        );
        assert_eq!(view.row_count(), 1);
    }

    #[test]
    fn test_empty_store_yields_sentinel_row() {
        let view = render(&ProductStore::new(), None, &RenderOptions::default());
        assert!(view.is_empty_state());
    }

    #[test]
    fn test_render_is_idempotent() {
        let store = store_with(&["Milk", "Bread"]);
        let options = RenderOptions::default();
        let first = render(&store, Some("r"), &options);
        let second = render(&store, Some("r"), &options);
        assert_eq!(first, second);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_row_projection() {
        let mut store = ProductStore::new();
        store.append(
            NewProduct {
                name: "Cola".to_string(),
                barcode: "5449".to_string(),
                price: "100".to_string(),
                total: "120.00".to_string(),
                image: Some(ImageAttachment::new("/home/u/cola.png")),
                ..NewProduct::default()
            },
            at(),
        );

        let view = render(&store, None, &RenderOptions::default());
        let row = &view.rows()[0];
        assert_eq!(row.id, 0);
        assert_eq!(row.description, "");
        assert_eq!(row.kind, "");
        assert_eq!(row.total, "120.00");
        assert_eq!(row.image, "cola.png");
        assert_eq!(row.timestamp, "5/17/2024, 2:05:09 PM");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(None, "%Y"), "");
        assert_eq!(format_timestamp(Some(&at()), "%Y-%m-%d %H:%M"), "2024-05-17 14:05");
        assert_eq!(format_timestamp(Some(&at()), "%Q"), "2024-05-17T14:05:09+00:00");
    }
}
