//! # Image Preview Loader
//!
//! Reads the picked image in the background and publishes it as a
//! `data:` URI the UI can use as an image source.
//!
//! ## Generations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load(a.png) ──► gen 1 ──► task reads a.png ─────────────┐              │
//! │  load(b.png) ──► gen 2 ──► abort gen 1 task               │              │
//! │                            task reads b.png ──┐          │ (if it still  │
//! │                                               ▼          ▼  completes)   │
//! │                                    gen 2 == current?  gen 1 == current? │
//! │                                    yes ─► PreviewReady  no ─► discarded  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The generation check and the publish happen under the same lock that
//! `load`/`clear` take to bump the generation, so a superseded read can
//! never publish after its successor started.
//!
//! ## Table Rows
//! ```text
//! render pass ──► load_rows([(0, a.png), (2, c.png)]) ──► pass 7
//!                   ├─ task: read a.png ──► RowPreviewReady { id: 0 }
//!                   └─ task: read c.png ──► RowPreviewReady { id: 2 }
//! next render pass ──► pass 8, every pass-7 read aborted
//! ```
//! Rows follow the same rule with their own counter: only reads of the
//! newest pass publish.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::events::{CatalogEvent, EventBus};

#[derive(Default)]
struct LoaderState {
    generation: u64,
    inflight: Option<JoinHandle<()>>,
    row_pass: u64,
    row_reads: Vec<JoinHandle<()>>,
}

/// Loads image previews, keeping only the newest request alive.
///
/// Must be used from inside a tokio runtime.
#[derive(Clone)]
pub struct PreviewLoader {
    state: Arc<Mutex<LoaderState>>,
    events: EventBus,
}

impl PreviewLoader {
    pub fn new(events: EventBus) -> Self {
        PreviewLoader {
            state: Arc::new(Mutex::new(LoaderState::default())),
            events,
        }
    }

    /// Starts loading `path`, superseding any previous load.
    ///
    /// Returns the generation the eventual `PreviewReady` will carry.
    pub fn load(&self, path: impl Into<PathBuf>) -> u64 {
        let path = path.into();
        let mut state = lock(&self.state);
        let generation = bump(&mut state);

        info!(generation, path = %path.display(), "Loading image preview");

        let shared = Arc::clone(&self.state);
        let events = self.events.clone();
        state.inflight = Some(tokio::spawn(async move {
            let data_uri = match read_data_uri(&path).await {
                Ok(uri) => uri,
                Err(e) => {
                    warn!(generation, error = %e, "Image preview failed");
                    return;
                }
            };

            let state = lock(&shared);
            if state.generation != generation {
                debug!(generation, current = state.generation, "Discarding stale preview");
                return;
            }
            events.publish(CatalogEvent::PreviewReady {
                generation,
                data_uri,
            });
            drop(state);
            debug!(generation, "Image preview ready");
        }));

        generation
    }

    /// Empties the preview area and cancels any pending load.
    pub fn clear(&self) -> u64 {
        let mut state = lock(&self.state);
        let generation = bump(&mut state);
        self.events
            .publish(CatalogEvent::PreviewCleared { generation });
        generation
    }

    /// The newest generation handed out.
    pub fn current_generation(&self) -> u64 {
        lock(&self.state).generation
    }

    /// Starts loading the pictures of a freshly rendered table.
    ///
    /// Takes `(product id, path)` pairs and aborts the reads of the
    /// previous pass. Returns the new pass number.
    pub fn load_rows<I, P>(&self, rows: I) -> u64
    where
        I: IntoIterator<Item = (u64, P)>,
        P: Into<PathBuf>,
    {
        let mut state = lock(&self.state);
        state.row_pass += 1;
        let pass = state.row_pass;
        for previous in state.row_reads.drain(..) {
            previous.abort();
        }

        for (id, path) in rows {
            let path = path.into();
            let shared = Arc::clone(&self.state);
            let events = self.events.clone();
            state.row_reads.push(tokio::spawn(async move {
                let data_uri = match read_data_uri(&path).await {
                    Ok(uri) => uri,
                    Err(e) => {
                        warn!(id, error = %e, "Row preview failed");
                        return;
                    }
                };

                let state = lock(&shared);
                if state.row_pass != pass {
                    debug!(id, pass, current = state.row_pass, "Discarding stale row preview");
                    return;
                }
                events.publish(CatalogEvent::RowPreviewReady { id, data_uri });
            }));
        }

        debug!(pass, rows = state.row_reads.len(), "Loading row previews");
        pass
    }

    /// The newest row pass handed out.
    pub fn current_row_pass(&self) -> u64 {
        lock(&self.state).row_pass
    }
}

impl std::fmt::Debug for PreviewLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewLoader")
            .field("generation", &self.current_generation())
            .finish_non_exhaustive()
    }
}

fn lock(state: &Mutex<LoaderState>) -> std::sync::MutexGuard<'_, LoaderState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

/// Moves to a new generation and aborts the previous read.
fn bump(state: &mut LoaderState) -> u64 {
    state.generation += 1;
    if let Some(previous) = state.inflight.take() {
        previous.abort();
    }
    state.generation
}

/// MIME type guessed from the file extension.
pub fn mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Reads a file and encodes it as `data:<mime>;base64,<payload>`.
pub async fn read_data_uri(path: &Path) -> AppResult<String> {
    let bytes = tokio::fs::read(path).await.map_err(|source| AppError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(format!("data:{};base64,{}", mime_type(path), STANDARD.encode(bytes)))
}
