//! # Line-Delimited JSON Driver
//!
//! Stands in for the presentation layer: one JSON command per input
//! line, one JSON object per output line.
//!
//! ## Wire Format
//! ```text
//! stdin                                          stdout
//! ─────                                          ──────
//! {"command":"validateField",          ──►  {"event":"fieldValidated","field":{...}}
//!  "name":"price","value":"12"}             {"event":"response","command":"validateField","data":{...}}
//!
//! {"command":"submit","values":{...}}  ──►  {"event":"fieldValidated",...} × fields
//!                                           {"event":"productAdded",...}
//!                                           {"event":"rowsRendered",...}
//!                                           {"event":"formReset"}
//!                                           {"event":"previewCleared",...}
//!                                           {"event":"notificationShown",...}
//!                                           {"event":"response","command":"submit","data":{...}}
//!
//!                          (once read)      {"event":"rowPreviewReady","id":0,"dataUri":"data:..."}
//!
//!                              (4s later)   {"event":"notificationExpired","id":"..."}
//!
//! not json                             ──►  {"event":"error","command":null,"error":{"code":"BAD_REQUEST",...}}
//! ```
//!
//! Events raised by a command are written before its response. Events
//! raised later (banner expiry, finished previews) are written as they
//! arrive. Input EOF ends the loop; events already queued are flushed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::commands::form::FieldDefinition;
use crate::commands::product::FormValues;
use crate::commands::{config, form, notification, product};
use crate::error::{ApiError, AppResult};
use crate::events::CatalogEvent;
use crate::AppContext;

/// A command as it arrives on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Request {
    Submit {
        #[serde(default)]
        values: FormValues,
    },
    Search {
        #[serde(default)]
        query: Option<String>,
    },
    ValidateField {
        name: String,
        #[serde(default)]
        value: String,
    },
    PreviewTotal {
        #[serde(default)]
        price: String,
    },
    SelectImage {
        path: String,
    },
    DismissNotification {
        id: Uuid,
    },
    DefineForm {
        fields: Vec<FieldDefinition>,
    },
    GetForm,
    ListProducts,
    ListNotifications,
    GetConfig,
    Reset,
}

impl Request {
    /// Wire name of the command, for replies and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Submit { .. } => "submit",
            Request::Search { .. } => "search",
            Request::ValidateField { .. } => "validateField",
            Request::PreviewTotal { .. } => "previewTotal",
            Request::SelectImage { .. } => "selectImage",
            Request::DismissNotification { .. } => "dismissNotification",
            Request::DefineForm { .. } => "defineForm",
            Request::GetForm => "getForm",
            Request::ListProducts => "listProducts",
            Request::ListNotifications => "listNotifications",
            Request::GetConfig => "getConfig",
            Request::Reset => "reset",
        }
    }
}

/// Answer to one command line.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Reply {
    Response {
        command: &'static str,
        data: Value,
    },
    Error {
        command: Option<&'static str>,
        error: ApiError,
    },
}

/// Runs one command against the context.
pub fn dispatch(ctx: &AppContext, request: Request) -> Result<Value, ApiError> {
    let data = match request {
        Request::Submit { values } => to_value(product::submit_product(
            &ctx.catalog,
            &ctx.config,
            &ctx.notifications,
            &ctx.preview,
            &ctx.events,
            values,
        )?)?,
        Request::Search { query } => to_value(product::search_products(
            &ctx.catalog,
            &ctx.config,
            &ctx.preview,
            &ctx.events,
            query,
        ))?,
        Request::ValidateField { name, value } => {
            to_value(form::validate_field(&ctx.catalog, &ctx.events, &name, value)?)?
        }
        Request::PreviewTotal { price } => {
            to_value(form::preview_total(&ctx.config, &ctx.events, price))?
        }
        Request::SelectImage { path } => to_value(form::select_image(
            &ctx.catalog,
            &ctx.preview,
            &ctx.events,
            path,
        )?)?,
        Request::DismissNotification { id } => {
            notification::dismiss_notification(&ctx.notifications, id)?;
            Value::Null
        }
        Request::DefineForm { fields } => to_value(form::define_form(&ctx.catalog, fields))?,
        Request::GetForm => to_value(form::get_form(&ctx.catalog))?,
        Request::ListProducts => to_value(product::list_products(&ctx.catalog))?,
        Request::ListNotifications => {
            to_value(notification::list_notifications(&ctx.notifications))?
        }
        Request::GetConfig => to_value(config::get_config(&ctx.config))?,
        Request::Reset => {
            ctx.catalog.reset();
            ctx.preview.clear();
            ctx.preview.load_rows(Vec::<(u64, String)>::new());
            ctx.events.publish(CatalogEvent::FormReset);
            info!("Catalog reset");
            Value::Null
        }
    };
    Ok(data)
}

fn to_value<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

/// Parses and runs one input line.
pub fn handle_line(ctx: &AppContext, line: &str) -> Reply {
    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Unparseable command");
            return Reply::Error {
                command: None,
                error: ApiError::bad_request(format!("Invalid command: {}", e)),
            };
        }
    };

    let command = request.name();
    debug!(command, "Dispatching command");
    match dispatch(ctx, request) {
        Ok(data) => Reply::Response { command, data },
        Err(error) => Reply::Error {
            command: Some(command),
            error,
        },
    }
}

/// Serves commands from `input` until EOF, writing replies and events
/// to `output`.
pub async fn serve<R, W>(ctx: &AppContext, input: R, output: &mut W) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut events = ctx.events.subscribe();
    let mut lines = input.lines();

    loop {
        tokio::select! {
            biased;

            received = events.recv() => match received {
                Ok(event) => write_line(output, &event).await?,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event stream lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },

            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let reply = handle_line(ctx, &line);
                flush_pending(&mut events, output).await?;
                write_line(output, &reply).await?;
            }
        }
    }

    flush_pending(&mut events, output).await?;
    output.flush().await?;
    Ok(())
}

/// Writes every event already queued, without waiting for more.
async fn flush_pending<W>(events: &mut broadcast::Receiver<CatalogEvent>, output: &mut W) -> AppResult<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        match events.try_recv() {
            Ok(event) => write_line(output, &event).await?,
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "Event stream lagged, events dropped");
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return Ok(()),
        }
    }
}

async fn write_line<W, T>(output: &mut W, value: &T) -> AppResult<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    output.write_all(&line).await?;
    output.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ConfigState;

    fn lines(output: &[u8]) -> Vec<Value> {
        std::str::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_request_parsing() {
        let request: Request =
            serde_json::from_str(r#"{"command":"validateField","name":"price","value":"12"}"#)
                .unwrap();
        assert_eq!(
            request,
            Request::ValidateField {
                name: "price".to_string(),
                value: "12".to_string(),
            }
        );

        let request: Request = serde_json::from_str(r#"{"command":"search"}"#).unwrap();
        assert_eq!(request, Request::Search { query: None });
        assert_eq!(request.name(), "search");
    }

    #[tokio::test]
    async fn test_bad_line_is_reported() {
        let ctx = AppContext::new(ConfigState::default());
        let reply = serde_json::to_value(handle_line(&ctx, "{not json")).unwrap();
        assert_eq!(reply["event"], "error");
        assert_eq!(reply["error"]["code"], "BAD_REQUEST");
        assert!(reply["command"].is_null());
    }

    #[tokio::test]
    async fn test_serve_writes_events_before_response() {
        let ctx = AppContext::new(ConfigState::default());
        let input: &[u8] = b"{\"command\":\"previewTotal\",\"price\":\"100\"}\n\n";
        let mut output = Vec::new();

        serve(&ctx, input, &mut output).await.unwrap();

        let out = lines(&output);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0]["event"], "totalPreviewed");
        assert_eq!(out[0]["total"], "120.00");
        assert_eq!(out[1]["event"], "response");
        assert_eq!(out[1]["command"], "previewTotal");
        assert_eq!(out[1]["data"], "120.00");
    }

    #[tokio::test]
    async fn test_serve_reports_command_errors() {
        let ctx = AppContext::new(ConfigState::default());
        let input: &[u8] = b"{\"command\":\"validateField\",\"name\":\"colour\",\"value\":\"red\"}\n";
        let mut output = Vec::new();

        serve(&ctx, input, &mut output).await.unwrap();

        let out = lines(&output);
        let last = out.last().unwrap();
        assert_eq!(last["event"], "error");
        assert_eq!(last["command"], "validateField");
        assert_eq!(last["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_reset_rewinds_ids() {
        let ctx = AppContext::new(ConfigState::default());
        let submit = r#"{"command":"submit","values":{"name":"Cola","barcode":"1","price":"1"}}"#;

        handle_line(&ctx, submit);
        handle_line(&ctx, r#"{"command":"reset"}"#);
        match handle_line(&ctx, submit) {
            Reply::Response { data, .. } => assert_eq!(data["id"], 0),
            other => panic!("unexpected reply: {:?}", other),
        }
    }
}
