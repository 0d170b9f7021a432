//! End-to-end flow through the commands: type, submit, search, expire.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use catalog_app::commands::{form, notification, product};
use catalog_app::commands::product::FormValues;
use catalog_app::events::CatalogEvent;
use catalog_app::state::ConfigState;
use catalog_app::AppContext;
use catalog_core::clock::FixedClock;
use catalog_core::form::keys;
use catalog_core::{RenderView, Severity};

fn context() -> AppContext {
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 17, 14, 5, 9).unwrap());
    AppContext::with_clock(ConfigState::default(), Arc::new(clock))
}

async fn next_row_preview(rx: &mut tokio::sync::broadcast::Receiver<CatalogEvent>) -> (u64, String) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let CatalogEvent::RowPreviewReady { id, data_uri } = rx.recv().await.unwrap() {
                return (id, data_uri);
            }
        }
    })
    .await
    .unwrap()
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<CatalogEvent>) -> Vec<CatalogEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

#[tokio::test(start_paused = true)]
async fn test_full_submission_flow() {
    let ctx = context();
    let mut rx = ctx.events.subscribe();

    // Live feedback while typing
    let field = form::validate_field(&ctx.catalog, &ctx.events, keys::PRICE, "12.99".into()).unwrap();
    assert!(field.is_valid());
    assert_eq!(form::preview_total(&ctx.config, &ctx.events, "12.99".into()), "14.40");

    let product = product::submit_product(
        &ctx.catalog,
        &ctx.config,
        &ctx.notifications,
        &ctx.preview,
        &ctx.events,
        FormValues::new()
            .with(keys::NAME, "Coca Cola")
            .with(keys::BARCODE, "5449000000996")
            .with(keys::DESCRIPTION, "0.5l")
            .with(keys::KIND, "drink"),
    )
    .unwrap();

    assert_eq!(product.id, 0);
    assert_eq!(product.price, "12.99");
    assert_eq!(product.total, "14.40");

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(e, CatalogEvent::ProductAdded { .. })));
    assert!(events.iter().any(|e| matches!(e, CatalogEvent::FormReset)));
    let rendered = events.iter().find_map(|e| match e {
        CatalogEvent::RowsRendered { view, .. } => Some(view.clone()),
        _ => None,
    });
    let rows = rendered.unwrap();
    assert_eq!(rows.rows().len(), 1);
    assert_eq!(rows.rows()[0].timestamp, "5/17/2024, 2:05:09 PM");

    // Banner lives for the configured lifetime
    let banners = notification::list_notifications(&ctx.notifications);
    assert_eq!(banners.len(), 1);
    assert_eq!(banners[0].severity, Severity::Success);

    tokio::time::sleep(Duration::from_millis(4001)).await;
    assert!(notification::list_notifications(&ctx.notifications).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_rejected_then_corrected_submission() {
    let ctx = context();
    let submit = |values: FormValues| {
        product::submit_product(
            &ctx.catalog,
            &ctx.config,
            &ctx.notifications,
            &ctx.preview,
            &ctx.events,
            values,
        )
    };

    let values = FormValues::new()
        .with(keys::NAME, "Tea")
        .with(keys::BARCODE, "x12")
        .with(keys::PRICE, "");
    let err = submit(values).unwrap_err();
    assert_eq!(err.message, "Forma nije validna");
    assert_eq!(err.fields, vec!["barcode".to_string(), "price".to_string()]);
    assert!(product::list_products(&ctx.catalog).is_empty());

    // Only the wrong fields need retyping; the name survived the rejection
    let product = submit(FormValues::new().with(keys::BARCODE, "12").with(keys::PRICE, "3")).unwrap();
    assert_eq!(product.name, "Tea");
    assert_eq!(product.id, 0);
    assert_eq!(product.total, "3.60");

    let severities: Vec<_> = notification::list_notifications(&ctx.notifications)
        .into_iter()
        .map(|n| n.severity)
        .collect();
    assert_eq!(severities, vec![Severity::Danger, Severity::Success]);
}

#[tokio::test]
async fn test_search_and_empty_state() {
    let ctx = context();
    for name in ["Cola", "Pepsi", "Cola Zero"] {
        product::submit_product(
            &ctx.catalog,
            &ctx.config,
            &ctx.notifications,
            &ctx.preview,
            &ctx.events,
            FormValues::new()
                .with(keys::NAME, name)
                .with(keys::BARCODE, "1")
                .with(keys::PRICE, "1"),
        )
        .unwrap();
    }

    let view = product::search_products(&ctx.catalog, &ctx.config, &ctx.preview, &ctx.events, Some("Cola".into()));
    let ids: Vec<u64> = view.rows().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![0, 2]);

    // Case-sensitive
    let view = product::search_products(&ctx.catalog, &ctx.config, &ctx.preview, &ctx.events, Some("cola".into()));
    assert_eq!(
        view,
        RenderView::Empty {
            message: "Nepostojeci prozivod".to_string(),
            colspan: 8,
        }
    );
    assert_eq!(product::list_products(&ctx.catalog).len(), 3);
}

#[tokio::test]
async fn test_image_selection_and_preview() {
    let ctx = context();
    let mut rx = ctx.events.subscribe();

    let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    file.write_all(b"png!").unwrap();
    let path = file.path().to_string_lossy().into_owned();

    let selection = form::select_image(&ctx.catalog, &ctx.preview, &ctx.events, path.clone()).unwrap();
    let generation = selection.generation.unwrap();

    let ready = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let CatalogEvent::PreviewReady { generation: g, data_uri } = rx.recv().await.unwrap() {
                return (g, data_uri);
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(ready.0, generation);
    assert!(ready.1.starts_with("data:image/png;base64,"));

    let product = product::submit_product(
        &ctx.catalog,
        &ctx.config,
        &ctx.notifications,
        &ctx.preview,
        &ctx.events,
        FormValues::new()
            .with(keys::NAME, "Chips")
            .with(keys::BARCODE, "7")
            .with(keys::PRICE, "2"),
    )
    .unwrap();

    let attachment = product.image.unwrap();
    assert_eq!(attachment.path, path);
    assert!(ctx.preview.current_generation() > generation);
}

#[tokio::test]
async fn test_rendered_rows_load_their_pictures() {
    let ctx = context();
    let mut rx = ctx.events.subscribe();

    let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    file.write_all(b"hi").unwrap();
    let path = file.path().to_string_lossy().into_owned();

    let submit = |name: &str, image: &str| {
        product::submit_product(
            &ctx.catalog,
            &ctx.config,
            &ctx.notifications,
            &ctx.preview,
            &ctx.events,
            FormValues::new()
                .with(keys::NAME, name)
                .with(keys::BARCODE, "1")
                .with(keys::PRICE, "1")
                .with(keys::IMAGE, image),
        )
        .unwrap()
    };

    // Submitting re-renders the table and loads the new row's picture
    let chips = submit("Chips", &path);
    assert_eq!(
        next_row_preview(&mut rx).await,
        (chips.id, "data:image/png;base64,aGk=".to_string())
    );

    // A product without an image gets no row picture
    submit("Water", "");
    let (id, _) = next_row_preview(&mut rx).await;
    assert_eq!(id, chips.id);

    // Searching re-renders and reloads only the shown rows
    product::search_products(&ctx.catalog, &ctx.config, &ctx.preview, &ctx.events, Some("Chips".into()));
    assert_eq!(next_row_preview(&mut rx).await.0, chips.id);

    product::search_products(&ctx.catalog, &ctx.config, &ctx.preview, &ctx.events, Some("Water".into()));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(drain(&mut rx)
        .iter()
        .all(|e| !matches!(e, CatalogEvent::RowPreviewReady { .. })));
}
