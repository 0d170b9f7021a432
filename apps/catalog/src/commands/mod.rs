//! # Commands Module
//!
//! Every operation the presentation layer can invoke.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs           ◄─── You are here (exports)
//! ├── product.rs       ◄─── submit_product, search_products, list_products
//! ├── form.rs          ◄─── define_form, validate_field, preview_total, select_image
//! ├── notification.rs  ◄─── list_notifications, dismiss_notification
//! └── config.rs        ◄─── get_config
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI event (submit, keyup, change)                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  {"command": "searchProducts", "query": "cola"}   (driver.rs)           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  fn search_products(                                                    │
//! │      catalog: &CatalogState,   ◄── only the state it needs              │
//! │      config: &ConfigState,                                              │
//! │      preview: &PreviewLoader,                                           │
//! │      events: &EventBus,                                                 │
//! │      query: Option<String>,                                             │
//! │  ) -> RenderView                                                        │
//! │         │                                                               │
//! │         ├──► return value  ──► {"ok": ...}                              │
//! │         └──► published events ──► {"event": "rowsRendered", ...}        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands that show banners or start previews spawn tokio tasks and
//! must run inside a runtime.

pub mod config;
pub mod form;
pub mod notification;
pub mod product;
