//! # Config Commands

use tracing::debug;

use crate::state::ConfigState;

/// Gets the current configuration.
///
/// ## Returns
/// Tax rate, notification lifetime, timestamp format and messages, so
/// the UI can label the total field and size its banners.
pub fn get_config(config: &ConfigState) -> ConfigState {
    debug!("get_config command");
    config.clone()
}
