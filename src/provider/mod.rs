//! Log source trait: the seam to the external log backend
//!
//! The monitor never talks to a transport directly. Anything that can
//! hand back the current log collection (an HTTP client for `/logs`, a
//! fixture, a replay file) implements `LogSource`.

use crate::error::{Result, WatchError};
use crate::types::LogEntry;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub mod callback;
pub mod memory;

/// Core trait for log backends
///
/// Timeouts, retries, and authentication are the implementation's
/// concern; the monitor awaits `fetch_logs` as-is.
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Fetch the complete current log collection
    async fn fetch_logs(&self) -> Result<Vec<LogEntry>>;

    /// Source name (e.g., "memory", "http")
    fn name(&self) -> &str;

    /// Health check, returns true if a fetch currently succeeds
    ///
    /// Default implementation performs a full fetch and discards it.
    async fn health(&self) -> Result<bool> {
        self.fetch_logs().await.map(|_| true)
    }
}

#[async_trait]
impl<T: LogSource + ?Sized> LogSource for Arc<T> {
    async fn fetch_logs(&self) -> Result<Vec<LogEntry>> {
        (**self).fetch_logs().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    async fn health(&self) -> Result<bool> {
        (**self).health().await
    }
}

/// Decode a backend `/logs` response body
///
/// Accepts either a bare JSON array of entries or an object with a
/// `logs` array. Records are decoded one by one: a record that is not
/// an object is skipped with a warning and never fails the collection.
/// Only a body that is not JSON, or has neither shape, is an error.
pub fn decode_logs(body: &[u8]) -> Result<Vec<LogEntry>> {
    let records = match serde_json::from_slice::<Value>(body)? {
        Value::Array(records) => records,
        Value::Object(mut object) => match object.remove("logs") {
            Some(Value::Array(records)) => records,
            Some(other) => {
                return Err(shape_error(format!(
                    "expected `logs` to be an array, found {}",
                    kind_of(&other)
                )))
            }
            None => return Err(shape_error("expected an object with a `logs` array")),
        },
        other => {
            return Err(shape_error(format!(
                "expected an array of log entries, found {}",
                kind_of(&other)
            )))
        }
    };

    let total = records.len();
    let logs: Vec<LogEntry> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping malformed log record");
                None
            }
        })
        .collect();

    if logs.len() < total {
        tracing::debug!(decoded = logs.len(), total, "Decoded log collection with skips");
    }
    Ok(logs)
}

fn shape_error(msg: impl std::fmt::Display) -> WatchError {
    WatchError::Serialization(serde::de::Error::custom(msg))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
