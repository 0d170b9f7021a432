//! # Product Commands
//!
//! Submitting the product form and searching the table.
//!
//! ## Submit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  submit_product(values)                                                 │
//! │       │                                                                 │
//! │       ▼   (session lock held)                                           │
//! │  apply values ─► form::submit ─► Ok ─► render(None) ─► form.reset()     │
//! │       │                           │                                     │
//! │       │                           └─ Err ─► (store untouched)           │
//! │       ▼   (lock released)                                               │
//! │  publish FieldValidated × fields                                        │
//! │  Ok:  ProductAdded, RowsRendered, FormReset, PreviewCleared, success   │
//! │       + one row-picture read per rendered product with an image         │
//! │  Err: danger banner                                                     │
//! │                                                                         │
//! │  Exactly one banner per attempt.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use catalog_core::form::{self, ProductForm};
use catalog_core::render::{render, row_images};
use catalog_core::{Product, ProductStore, RenderView, ValidationFailure};

use crate::error::ApiError;
use crate::events::{CatalogEvent, EventBus};
use crate::notifications::NotificationCenter;
use crate::preview::PreviewLoader;
use crate::state::{CatalogState, ConfigState};

/// Raw values typed into the form, keyed by field name.
///
/// Keys that name no form field are ignored; fields without a key keep
/// their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(pub BTreeMap<String, String>);

impl FormValues {
    pub fn new() -> Self {
        FormValues::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }

    fn apply_to(&self, form: &mut ProductForm) {
        for (name, value) in &self.0 {
            if let Some(field) = form.field_mut(name) {
                field.set_value(value.as_str());
            }
        }
    }
}

/// Validates the form and, if valid, adds the product.
///
/// ## Returns
/// - `Ok(Product)`: the stored product, with id, total and timestamp
/// - `Err(ApiError)` with code `VALIDATION_ERROR` listing the invalid fields
pub fn submit_product(
    catalog: &CatalogState,
    config: &ConfigState,
    notifications: &NotificationCenter,
    preview: &PreviewLoader,
    events: &EventBus,
    values: FormValues,
) -> Result<Product, ApiError> {
    let start = Instant::now();
    debug!(fields = values.0.len(), "submit_product command");

    let options = config.render_options();
    type Rendered = (Product, RenderView, Vec<(u64, String)>);
    let (outcome, validated_fields): (Result<Rendered, ValidationFailure>, _) =
        catalog.with_session_mut(|session| {
            values.apply_to(&mut session.form);

            let outcome = form::submit(
                &mut session.form,
                &mut session.store,
                catalog.registry(),
                config.tax_rate(),
                catalog.clock(),
            )
            .map(|product| {
                let view = render(&session.store, None, &options);
                (product, view, image_paths(&session.store, None))
            });

            let validated_fields = session.form.fields.clone();
            if outcome.is_ok() {
                session.form.reset();
                session.last_query = None;
            }
            (outcome, validated_fields)
        });

    for field in validated_fields {
        events.publish(CatalogEvent::FieldValidated { field });
    }

    match outcome {
        Ok((product, view, images)) => {
            events.publish(CatalogEvent::ProductAdded {
                product: product.clone(),
            });
            events.publish(CatalogEvent::RowsRendered { query: None, view });
            events.publish(CatalogEvent::FormReset);
            preview.clear();
            preview.load_rows(images);
            notifications.success(config.success_message.as_str());

            info!(
                id = product.id,
                name = %product.name,
                elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                "submit_product accepted"
            );
            Ok(product)
        }
        Err(failure) => {
            notifications.danger(config.failure_message.as_str());
            info!(invalid = ?failure.invalid_fields(), "submit_product rejected");
            Err(ApiError::validation(&failure, config.failure_message.as_str()))
        }
    }
}

/// Re-renders the table for the search box.
///
/// `None` or `""` shows every product. The store is never modified.
/// Pictures of the shown rows follow as `RowPreviewReady` events.
pub fn search_products(
    catalog: &CatalogState,
    config: &ConfigState,
    preview: &PreviewLoader,
    events: &EventBus,
    query: Option<String>,
) -> RenderView {
    let query = query.filter(|q| !q.is_empty());
    let options = config.render_options();

    let (view, images) = catalog.with_session_mut(|session| {
        session.last_query = query.clone();
        (
            render(&session.store, query.as_deref(), &options),
            image_paths(&session.store, query.as_deref()),
        )
    });

    debug!(query = ?query, rows = view.rows().len(), "search_products complete");
    events.publish(CatalogEvent::RowsRendered {
        query,
        view: view.clone(),
    });
    preview.load_rows(images);
    view
}

fn image_paths(store: &ProductStore, query: Option<&str>) -> Vec<(u64, String)> {
    row_images(store, query)
        .into_iter()
        .map(|(id, image)| (id, image.path.clone()))
        .collect()
}

/// Returns every stored product, in insertion order.
pub fn list_products(catalog: &CatalogState) -> Vec<Product> {
    catalog.with_session(|session| session.store.products().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::form::keys;
    use catalog_core::Severity;
    use std::sync::Arc;
    use std::time::Duration;

    struct Harness {
        catalog: CatalogState,
        config: ConfigState,
        notifications: NotificationCenter,
        preview: PreviewLoader,
        events: EventBus,
    }

    fn harness() -> Harness {
        let config = ConfigState::default();
        let events = EventBus::new();
        let catalog = CatalogState::new(config.validator_registry());
        let notifications = NotificationCenter::new(
            events.clone(),
            Duration::from_secs(4),
            Arc::new(catalog_core::clock::SystemClock),
        );
        let preview = PreviewLoader::new(events.clone());
        Harness {
            catalog,
            config,
            notifications,
            preview,
            events,
        }
    }

    impl Harness {
        fn submit(&self, values: FormValues) -> Result<Product, ApiError> {
            submit_product(
                &self.catalog,
                &self.config,
                &self.notifications,
                &self.preview,
                &self.events,
                values,
            )
        }
    }

    fn cola() -> FormValues {
        FormValues::new()
            .with(keys::NAME, "Cola")
            .with(keys::BARCODE, "5449000")
            .with(keys::PRICE, "100")
    }

    #[tokio::test]
    async fn test_submit_adds_product_and_resets_form() {
        let h = harness();
        let product = h.submit(cola()).unwrap();

        assert_eq!(product.id, 0);
        assert_eq!(product.total, "120.00");
        assert_eq!(list_products(&h.catalog).len(), 1);
        h.catalog.with_session(|s| assert_eq!(s.form.value(keys::NAME), ""));

        let banners = h.notifications.active();
        assert_eq!(banners.len(), 1);
        assert_eq!(banners[0].severity, Severity::Success);
        assert_eq!(banners[0].message, "Proizvod je uspesno dodat");
    }

    #[tokio::test]
    async fn test_rejected_submit_keeps_store_and_values() {
        let h = harness();
        let err = h.submit(cola().with(keys::PRICE, "free")).unwrap_err();

        assert_eq!(err.fields, vec!["price".to_string()]);
        assert!(list_products(&h.catalog).is_empty());
        h.catalog.with_session(|s| {
            assert_eq!(s.form.value(keys::NAME), "Cola");
            assert!(s.form.has_errors());
        });

        let banners = h.notifications.active();
        assert_eq!(banners.len(), 1);
        assert_eq!(banners[0].severity, Severity::Danger);
    }

    #[tokio::test]
    async fn test_rejection_uses_configured_message() {
        let mut h = harness();
        h.config.failure_message = "Form is not valid".to_string();

        let err = h.submit(cola().with(keys::BARCODE, "")).unwrap_err();
        assert_eq!(err.message, "Form is not valid");
        assert_eq!(h.notifications.active()[0].message, "Form is not valid");
    }

    #[tokio::test]
    async fn test_submit_rerenders_unfiltered() {
        let h = harness();
        h.submit(cola()).unwrap();
        search_products(&h.catalog, &h.config, &h.preview, &h.events, Some("Tea".to_string()));

        let mut rx = h.events.subscribe();
        h.submit(cola().with(keys::NAME, "Water")).unwrap();

        let mut rendered = None;
        while let Ok(event) = rx.try_recv() {
            if let CatalogEvent::RowsRendered { query, view } = event {
                rendered = Some((query, view));
            }
        }
        let (query, view) = rendered.unwrap();
        assert!(query.is_none());
        assert_eq!(view.rows().len(), 2);
        h.catalog.with_session(|s| assert!(s.last_query.is_none()));
    }

    #[tokio::test]
    async fn test_search_does_not_touch_store() {
        let h = harness();
        h.submit(cola()).unwrap();
        h.submit(cola().with(keys::NAME, "Pepsi")).unwrap();

        let view = search_products(&h.catalog, &h.config, &h.preview, &h.events, Some("Pep".to_string()));
        assert_eq!(view.rows().len(), 1);
        assert_eq!(view.rows()[0].name, "Pepsi");

        let empty = search_products(&h.catalog, &h.config, &h.preview, &h.events, Some("Fanta".to_string()));
        assert!(empty.is_empty_state());

        let all = search_products(&h.catalog, &h.config, &h.preview, &h.events, Some(String::new()));
        assert_eq!(all.rows().len(), 2);
        assert_eq!(list_products(&h.catalog).len(), 2);
    }
}
