//! Closure-backed log source
//!
//! Adapts any async fetch function into a `LogSource`, for wiring an
//! existing HTTP client or scripting fetch timing in tests.

use crate::error::Result;
use crate::provider::LogSource;
use crate::types::LogEntry;
use async_trait::async_trait;
use futures::future::BoxFuture;

type FetchFn = dyn Fn() -> BoxFuture<'static, Result<Vec<LogEntry>>> + Send + Sync;

/// Log source that delegates each fetch to a closure
pub struct FnLogSource {
    name: String,
    fetch: Box<FetchFn>,
}

impl FnLogSource {
    /// Create a source named `name` that calls `fetch` on every refresh
    pub fn new(
        name: impl Into<String>,
        fetch: impl Fn() -> BoxFuture<'static, Result<Vec<LogEntry>>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            fetch: Box::new(fetch),
        }
    }
}

#[async_trait]
impl LogSource for FnLogSource {
    async fn fetch_logs(&self) -> Result<Vec<LogEntry>> {
        (self.fetch)().await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
