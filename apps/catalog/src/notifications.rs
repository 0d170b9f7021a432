//! # Notification Center
//!
//! Success/failure banners that remove themselves after a fixed delay.
//!
//! ## Lifecycle
//! ```text
//! show("Proizvod je uspesno dodat", Success)
//!      │
//!      ├──► active list += notification
//!      ├──► publish NotificationShown
//!      └──► spawn timer ── sleep(ttl) ──► active list -= notification
//!                                         publish NotificationExpired
//!
//! dismiss(id) before the timer fires:
//!      abort timer, remove, publish NotificationExpired
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use catalog_core::clock::Clock;
use catalog_core::{Notification, Severity};

use crate::events::{CatalogEvent, EventBus};

struct ActiveNotification {
    notification: Notification,
    timer: JoinHandle<()>,
}

/// Owns the visible banners and their expiry timers.
///
/// Must be used from inside a tokio runtime.
#[derive(Clone)]
pub struct NotificationCenter {
    active: Arc<Mutex<Vec<ActiveNotification>>>,
    events: EventBus,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl NotificationCenter {
    pub fn new(events: EventBus, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        NotificationCenter {
            active: Arc::new(Mutex::new(Vec::new())),
            events,
            ttl,
            clock,
        }
    }

    /// Shows a banner and schedules its removal.
    pub fn show(&self, message: impl Into<String>, severity: Severity) -> Notification {
        let notification = Notification::new(message, severity, self.clock.now());
        let id = notification.id;

        info!(%id, %severity, message = %notification.message, "Showing notification");

        // Hold the list while spawning so the timer cannot look for the
        // entry before it is pushed, and Shown always precedes Expired
        let mut list = lock(&self.active);

        let timer = {
            let active = Arc::clone(&self.active);
            let events = self.events.clone();
            let ttl = self.ttl;
            tokio::spawn(async move {
                tokio::time::sleep(ttl).await;
                if remove(&active, id).is_some() {
                    debug!(%id, "Notification expired");
                    events.publish(CatalogEvent::NotificationExpired { id });
                }
            })
        };

        list.push(ActiveNotification {
            notification: notification.clone(),
            timer,
        });
        self.events.publish(CatalogEvent::NotificationShown {
            notification: notification.clone(),
        });
        drop(list);

        notification
    }

    pub fn success(&self, message: impl Into<String>) -> Notification {
        self.show(message, Severity::Success)
    }

    pub fn danger(&self, message: impl Into<String>) -> Notification {
        self.show(message, Severity::Danger)
    }

    /// Removes a banner early. Returns false if it was already gone.
    pub fn dismiss(&self, id: Uuid) -> bool {
        match remove(&self.active, id) {
            Some(entry) => {
                entry.timer.abort();
                debug!(%id, "Notification dismissed");
                self.events.publish(CatalogEvent::NotificationExpired { id });
                true
            }
            None => false,
        }
    }

    /// Banners currently visible, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        lock(&self.active)
            .iter()
            .map(|a| a.notification.clone())
            .collect()
    }
}

impl std::fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn lock(active: &Mutex<Vec<ActiveNotification>>) -> std::sync::MutexGuard<'_, Vec<ActiveNotification>> {
    active.lock().unwrap_or_else(|e| e.into_inner())
}

fn remove(active: &Mutex<Vec<ActiveNotification>>, id: Uuid) -> Option<ActiveNotification> {
    let mut list = lock(active);
    let index = list.iter().position(|a| a.notification.id == id)?;
    Some(list.remove(index))
}
