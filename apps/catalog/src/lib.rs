//! # Catalog App Library
//!
//! Runtime side of the product catalog: owns the session, runs the timed
//! and asynchronous parts, and exposes every operation as a command.
//!
//! ## Module Organization
//! ```text
//! catalog_app/
//! ├── lib.rs            ◄─── You are here (context, tracing, run)
//! ├── state/
//! │   ├── mod.rs        ◄─── State type exports
//! │   ├── catalog.rs    ◄─── Store + form session behind a mutex
//! │   └── config.rs     ◄─── Configuration state
//! ├── commands/
//! │   ├── mod.rs        ◄─── Command exports
//! │   ├── product.rs    ◄─── Submit / search / list
//! │   ├── form.rs       ◄─── Live validation, totals, image selection
//! │   ├── notification.rs
//! │   └── config.rs
//! ├── events.rs         ◄─── EventBus + CatalogEvent
//! ├── notifications.rs  ◄─── Self-expiring banners
//! ├── preview.rs        ◄─── Background image preview loader
//! ├── driver.rs         ◄─── Line-delimited JSON front end
//! └── error.rs          ◄─── AppError / ApiError
//! ```
//!
//! ## State Management
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           AppContext                                    │
//! │                                                                         │
//! │  ┌──────────────┐ ┌─────────────┐ ┌────────────────────┐ ┌───────────┐ │
//! │  │ CatalogState │ │ ConfigState │ │ NotificationCenter │ │ Preview-  │ │
//! │  │              │ │             │ │                    │ │ Loader    │ │
//! │  │ • store      │ │ • tax rate  │ │ • active banners   │ │ • gen no. │ │
//! │  │ • form       │ │ • ttl       │ │ • expiry timers    │ │ • in-     │ │
//! │  │ • registry   │ │ • messages  │ │                    │ │   flight  │ │
//! │  └──────────────┘ └─────────────┘ └─────────┬──────────┘ └─────┬─────┘ │
//! │                                              └──────┬───────────┘       │
//! │                                                     ▼                   │
//! │                                                 EventBus                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Each command takes only the pieces it needs; the context just keeps
//! them together.

pub mod commands;
pub mod driver;
pub mod error;
pub mod events;
pub mod notifications;
pub mod preview;
pub mod state;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use catalog_core::clock::{Clock, SystemClock};

use error::AppResult;
use events::EventBus;
use notifications::NotificationCenter;
use preview::PreviewLoader;
use state::{CatalogState, ConfigState};

/// All runtime state, wired to one event bus.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub catalog: CatalogState,
    pub config: ConfigState,
    pub notifications: NotificationCenter,
    pub preview: PreviewLoader,
    pub events: EventBus,
}

impl AppContext {
    /// Builds the context from a configuration, using the wall clock.
    pub fn new(config: ConfigState) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Builds the context with an explicit time source.
    pub fn with_clock(config: ConfigState, clock: Arc<dyn Clock>) -> Self {
        let events = EventBus::new();
        let catalog = CatalogState::with_clock(config.validator_registry(), Arc::clone(&clock));
        let notifications =
            NotificationCenter::new(events.clone(), config.notification_ttl(), clock);
        let preview = PreviewLoader::new(events.clone());

        AppContext {
            catalog,
            config,
            notifications,
            preview,
            events,
        }
    }
}

/// Runs the catalog over stdin/stdout.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize Logging ──► stderr, EnvFilter (RUST_LOG, default info)   │
/// │  2. Load Config ─────────► CATALOG_CONFIG file, then CATALOG_* env      │
/// │  3. Build AppContext ────► empty store, standard form, id counter 0     │
/// │  4. Serve ───────────────► one JSON command per stdin line until EOF    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> AppResult<()> {
    init_tracing();

    info!("Starting product catalog");

    let config = ConfigState::load()?;
    info!(
        tax_rate_bps = config.tax_rate_bps,
        notification_ttl_ms = config.notification_ttl_ms,
        image_extensions = ?config.image_extensions,
        "Configuration loaded"
    );

    let ctx = AppContext::new(config);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    driver::serve(&ctx, stdin, &mut stdout).await?;

    info!(
        products = ctx.catalog.with_session(|s| s.store.len()),
        "Input closed, shutting down"
    );
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=catalog_core=trace` - Trace the core crate only
/// - Default: INFO level
///
/// Logs go to stderr; stdout carries the event stream.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
