//! In-memory log source for development and testing
//!
//! Holds a mutable collection and can be told to fail, so callers can
//! exercise outage handling without a backend.

use crate::error::{Result, WatchError};
use crate::provider::LogSource;
use crate::types::LogEntry;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// In-memory log source
#[derive(Default)]
pub struct MemoryLogSource {
    logs: RwLock<Vec<LogEntry>>,
    failure: RwLock<Option<String>>,
    fetches: AtomicU64,
}

impl MemoryLogSource {
    /// Create a source serving `logs`
    pub fn new(logs: Vec<LogEntry>) -> Self {
        Self {
            logs: RwLock::new(logs),
            ..Default::default()
        }
    }

    /// Replace the served collection
    pub async fn set_logs(&self, logs: Vec<LogEntry>) {
        *self.logs.write().await = logs;
    }

    /// Append one entry to the served collection
    pub async fn push(&self, entry: LogEntry) {
        self.logs.write().await.push(entry);
    }

    /// Make every following fetch fail with `reason`
    pub async fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.write().await = Some(reason.into());
    }

    /// Clear an injected failure
    pub async fn recover(&self) {
        *self.failure.write().await = None;
    }

    /// Number of fetch attempts so far, failed ones included
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LogSource for MemoryLogSource {
    async fn fetch_logs(&self) -> Result<Vec<LogEntry>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = self.failure.read().await.as_ref() {
            return Err(WatchError::Source(reason.clone()));
        }

        Ok(self.logs.read().await.clone())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
