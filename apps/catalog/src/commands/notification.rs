//! # Notification Commands
//!
//! Reading and dismissing the banners shown by the notification center.

use tracing::debug;
use uuid::Uuid;

use catalog_core::Notification;

use crate::error::ApiError;
use crate::notifications::NotificationCenter;

/// Banners currently visible, oldest first.
pub fn list_notifications(notifications: &NotificationCenter) -> Vec<Notification> {
    notifications.active()
}

/// Closes a banner before its timer runs out.
pub fn dismiss_notification(notifications: &NotificationCenter, id: Uuid) -> Result<(), ApiError> {
    debug!(%id, "dismiss_notification command");
    if notifications.dismiss(id) {
        Ok(())
    } else {
        Err(ApiError::not_found("Notification", &id.to_string()))
    }
}
