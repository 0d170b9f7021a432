//! # Catalog Entry Point
//!
//! Reads JSON commands from stdin and writes JSON events to stdout.
//! The actual setup is in lib.rs for testability.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match catalog_app::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "catalog exited with an error");
            ExitCode::FAILURE
        }
    }
}
