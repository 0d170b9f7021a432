//! # Catalog State
//!
//! The session the commands operate on: the product store, the form as
//! the user currently sees it, and the last search query.
//!
//! ## Thread Safety
//! Events are handled one at a time, but commands are `async` and the
//! handle is shared, so the session sits behind `Arc<Mutex<T>>`. The
//! lock is never held across an `.await`.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Frontend Action          Command              Session Change           │
//! │  ───────────────          ───────              ──────────────           │
//! │  Submit form ───────────► submit_product ────► store.append, form reset │
//! │  Type in search ────────► search_products ───► last_query = q           │
//! │  Type in a field ───────► validate_field ────► form.field.verdict       │
//! │  Reset (tests) ─────────► reset ─────────────► empty store, id 0        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex};

use catalog_core::clock::{Clock, SystemClock};
use catalog_core::form::ProductForm;
use catalog_core::{ProductStore, ValidatorRegistry};

/// Mutable part of the session.
#[derive(Debug, Clone, Default)]
pub struct CatalogSession {
    pub store: ProductStore,
    pub form: ProductForm,
    /// Query currently in the search box, if any.
    pub last_query: Option<String>,
}

impl CatalogSession {
    /// A fresh session with the standard product form.
    pub fn new() -> Self {
        CatalogSession {
            store: ProductStore::new(),
            form: ProductForm::standard(),
            last_query: None,
        }
    }
}

/// Shared handle to the session plus its fixed collaborators.
#[derive(Clone)]
pub struct CatalogState {
    session: Arc<Mutex<CatalogSession>>,
    registry: Arc<ValidatorRegistry>,
    clock: Arc<dyn Clock>,
}

impl CatalogState {
    /// Creates a session using the wall clock.
    pub fn new(registry: ValidatorRegistry) -> Self {
        Self::with_clock(registry, Arc::new(SystemClock))
    }

    /// Creates a session with an explicit time source.
    pub fn with_clock(registry: ValidatorRegistry, clock: Arc<dyn Clock>) -> Self {
        CatalogState {
            session: Arc::new(Mutex::new(CatalogSession::new())),
            registry: Arc::new(registry),
            clock,
        }
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Executes a function with read access to the session.
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CatalogSession) -> R,
    {
        // Every mutation leaves the session consistent, so a poisoned
        // lock still guards usable data
        let session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        f(&session)
    }

    /// Executes a function with write access to the session.
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CatalogSession) -> R,
    {
        let mut session = self.session.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut session)
    }

    /// Drops every product, rewinds ids and clears the form's values.
    ///
    /// The form keeps its current layout, including one set by
    /// `define_form`.
    pub fn reset(&self) {
        self.with_session_mut(|s| {
            s.store.reset();
            s.form.reset();
            s.last_query = None;
        });
    }
}

impl std::fmt::Debug for CatalogState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogState")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
