//! # catalog-core: Pure Logic for the Product Catalog Form
//!
//! Validation, pricing, the product store and the table render pipeline,
//! as plain functions and data with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Product Catalog Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Presentation layer                           │   │
//! │  │    Product form ──► Search box ──► Products table ──► Alerts    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON commands / events                 │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/catalog                                 │   │
//! │  │    submit_product, search_products, validate_field, ...         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ catalog-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐ ┌─────────┐ ┌─────────┐ ┌────────┐ ┌───────┐  │   │
//! │  │   │ validation │ │ pricing │ │  store  │ │ render │ │ form  │  │   │
//! │  │   └────────────┘ └─────────┘ └─────────┘ └────────┘ └───────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO TIMERS • NO FILES • TIME ONLY THROUGH `Clock`              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`validation`] - Validator registry and field validation engine
//! - [`pricing`] - Integer-prefix parsing and price-with-tax
//! - [`store`] - Append-only product store
//! - [`render`] - Filter/render pipeline for the products table
//! - [`form`] - Product form and the submit step
//! - [`types`] - Product, rows, notifications
//! - [`clock`] - Time source seam
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use catalog_core::clock::SystemClock;
//! use catalog_core::form::{keys, submit, ProductForm};
//! use catalog_core::pricing::TaxRate;
//! use catalog_core::render::{render, RenderOptions};
//! use catalog_core::store::ProductStore;
//! use catalog_core::validation::ValidatorRegistry;
//!
//! let registry = ValidatorRegistry::standard(&["PNG"]);
//! let mut store = ProductStore::new();
//! let mut form = ProductForm::standard()
//!     .with_value(keys::NAME, "Cola")
//!     .with_value(keys::BARCODE, "5449000")
//!     .with_value(keys::PRICE, "100");
//!
//! let product = submit(&mut form, &mut store, &registry, TaxRate::STANDARD, &SystemClock).unwrap();
//! assert_eq!(product.total, "120.00");
//!
//! let view = render(&store, Some("Co"), &RenderOptions::default());
//! assert_eq!(view.rows().len(), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod error;
pub mod form;
pub mod pricing;
pub mod render;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError, ValidationFailure};
pub use pricing::{with_tax, TaxRate};
pub use store::ProductStore;
pub use types::*;
pub use validation::{validate_field, Field, FieldSpec, ValidatorName, ValidatorRegistry};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Image extensions the `image-format` validator accepts out of the box.
pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["PNG"];

/// How long a notification banner stays up, in milliseconds.
pub const DEFAULT_NOTIFICATION_TTL_MS: u64 = 4000;

/// Timestamp column pattern (en-US `toLocaleString` style).
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Banner text after a product is added.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Proizvod je uspesno dodat";

/// Banner text after a rejected submission.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Forma nije validna";

/// Text of the "no results" table row.
pub const DEFAULT_EMPTY_MESSAGE: &str = "Nepostojeci prozivod";
