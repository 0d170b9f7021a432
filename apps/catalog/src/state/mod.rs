//! # State Module
//!
//! Application state shared by the commands.
//!
//! Separate state types instead of one `AppState`, so each command
//! declares exactly what it touches:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────────┐  │
//! │  │  CatalogState    │  │   ConfigState    │  │  NotificationCenter  │  │
//! │  │  Arc<Mutex<      │  │  read-only       │  │  (notifications.rs)  │  │
//! │  │   CatalogSession │  │  tax, ttl, fmt   │  │                      │  │
//! │  │  >>              │  │                  │  │  PreviewLoader       │  │
//! │  └──────────────────┘  └──────────────────┘  │  (preview.rs)        │  │
//! │                                               └──────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod catalog;
mod config;

pub use catalog::{CatalogSession, CatalogState};
pub use config::{ConfigState, CONFIG_PATH_ENV};
