//! Log monitor: refresh driver and filtered views over a log source
//!
//! `LogMonitor` owns the last successfully fetched log collection, the
//! alert set derived from it, and the user's current filters. It
//! refreshes on a fixed interval and on demand.
//!
//! - Each applied refresh replaces the collection and re-derives every
//!   alert from scratch; nothing is patched incrementally.
//! - A failed refresh keeps the previous collection and raises an error
//!   flag in the view. The next successful refresh clears it.
//! - Every refresh takes a request number. A fetch that completes after
//!   a newer one has already been applied is discarded, so a slow
//!   earlier request can never overwrite fresher data.

use crate::config::MonitorConfig;
use crate::error::Result;
use crate::provider::LogSource;
use crate::query::{filtered_alerts, filtered_logs, LogStats};
use crate::triage::{triage_all, AlertSummary};
use crate::types::{Alert, FilterState, FilterUpdate, LogEntry};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::WatchStream;

/// What happened to a completed refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The fetch replaced the collection
    Applied { entries: usize, alerts: usize },
    /// A newer fetch was applied first; this one was dropped
    Stale { request: u64, applied: u64 },
}

/// Snapshot of both filtered views plus refresh status
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogView {
    /// Logs passing the current filters
    pub logs: Vec<LogEntry>,

    /// Alerts passing the current filters
    pub alerts: Vec<Alert>,

    /// Decision counts over the whole collection
    pub stats: LogStats,

    /// Alert counts over the whole alert set
    pub summary: AlertSummary,

    /// Filters the views were computed with
    pub filters: FilterState,

    /// Error from the latest refresh, if it failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,

    /// When the shown collection was fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,

    /// Bumped on every applied refresh, failure, or filter change
    pub generation: u64,
}

impl LogView {
    /// Whether the view is showing data from before a failed refresh
    pub fn is_stale(&self) -> bool {
        self.last_error.is_some()
    }
}

#[derive(Default)]
struct MonitorState {
    logs: Vec<LogEntry>,
    alerts: Vec<Alert>,
    filters: FilterState,
    /// Request number of the collection currently held (0 = none yet)
    applied_request: u64,
    last_error: Option<String>,
    fetched_at: Option<DateTime<Utc>>,
    generation: u64,
}

/// Background polling task started by [`LogMonitor::spawn_polling`]
///
/// Dropping the handle aborts the task.
#[must_use = "polling stops when the handle is dropped"]
#[derive(Debug)]
pub struct PollingHandle {
    task: JoinHandle<()>,
}

impl PollingHandle {
    /// Stop polling; same as dropping the handle
    pub fn stop(self) {}

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for PollingHandle {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!("Log polling stopped");
    }
}

/// Refresh driver and view source over a pluggable log source
pub struct LogMonitor {
    source: Box<dyn LogSource>,
    config: MonitorConfig,
    state: RwLock<MonitorState>,
    next_request: AtomicU64,
    generation_tx: watch::Sender<u64>,
}

impl LogMonitor {
    /// Create a monitor with default configuration
    pub fn new(source: impl LogSource + 'static) -> Self {
        Self::build(Box::new(source), MonitorConfig::default())
    }

    /// Create a monitor with explicit configuration
    pub fn with_config(source: impl LogSource + 'static, config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(Box::new(source), config))
    }

    fn build(source: Box<dyn LogSource>, config: MonitorConfig) -> Self {
        let (generation_tx, _) = watch::channel(0);
        let state = MonitorState {
            filters: config.initial_filters.clone(),
            ..Default::default()
        };

        Self {
            source,
            config,
            state: RwLock::new(state),
            next_request: AtomicU64::new(0),
            generation_tx,
        }
    }

    /// Get the log source name
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Fetch from the source and apply the result if it is the newest
    ///
    /// On failure the held collection is kept, the error is recorded in
    /// the view, and the error is returned to the caller.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let request = self.next_request.fetch_add(1, Ordering::SeqCst) + 1;

        match self.source.fetch_logs().await {
            Ok(logs) => {
                let alerts = triage_all(&logs);
                let mut state = self.state.write().await;

                if request <= state.applied_request {
                    tracing::debug!(
                        request,
                        applied = state.applied_request,
                        "Discarding stale log fetch"
                    );
                    return Ok(RefreshOutcome::Stale {
                        request,
                        applied: state.applied_request,
                    });
                }

                let outcome = RefreshOutcome::Applied {
                    entries: logs.len(),
                    alerts: alerts.len(),
                };

                state.applied_request = request;
                state.logs = logs;
                state.alerts = alerts;
                state.last_error = None;
                state.fetched_at = Some(Utc::now());
                self.bump(&mut state);

                tracing::info!(
                    source = %self.source.name(),
                    request,
                    entries = state.logs.len(),
                    alerts = state.alerts.len(),
                    "Logs refreshed"
                );
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(
                    source = %self.source.name(),
                    request,
                    error = %e,
                    "Log refresh failed, keeping last good collection"
                );

                let mut state = self.state.write().await;
                if request > state.applied_request {
                    state.last_error = Some(e.to_string());
                    self.bump(&mut state);
                }
                Err(e)
            }
        }
    }

    /// Merge a partial filter change into the current filters
    ///
    /// Returns the filters now in effect.
    pub async fn apply_filters(&self, update: FilterUpdate) -> FilterState {
        let mut state = self.state.write().await;
        if state.filters.apply(update) {
            tracing::debug!(filters = ?state.filters, "Filters changed");
            self.bump(&mut state);
        }
        state.filters.clone()
    }

    /// Restore default filters
    pub async fn reset_filters(&self) -> FilterState {
        let mut state = self.state.write().await;
        if state.filters != FilterState::default() {
            state.filters.reset();
            self.bump(&mut state);
        }
        state.filters.clone()
    }

    pub async fn filters(&self) -> FilterState {
        self.state.read().await.filters.clone()
    }

    /// Logs passing the current filters, in source order
    pub async fn filtered_logs(&self) -> Vec<LogEntry> {
        let state = self.state.read().await;
        filtered_logs(&state.logs, &state.filters)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Alerts passing the current filters, in source order
    pub async fn filtered_alerts(&self) -> Vec<Alert> {
        let state = self.state.read().await;
        filtered_alerts(&state.alerts, &state.filters)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Unfiltered alert set derived from the held collection
    pub async fn alerts(&self) -> Vec<Alert> {
        self.state.read().await.alerts.clone()
    }

    /// Consistent snapshot of both views and refresh status
    pub async fn view(&self) -> LogView {
        let state = self.state.read().await;
        LogView {
            logs: filtered_logs(&state.logs, &state.filters)
                .into_iter()
                .cloned()
                .collect(),
            alerts: filtered_alerts(&state.alerts, &state.filters)
                .into_iter()
                .cloned()
                .collect(),
            stats: LogStats::from_logs(&state.logs),
            summary: AlertSummary::from_alerts(&state.alerts),
            filters: state.filters.clone(),
            last_error: state.last_error.clone(),
            fetched_at: state.fetched_at,
            generation: state.generation,
        }
    }

    /// Stream of view generations; yields the current one first
    pub fn subscribe(&self) -> WatchStream<u64> {
        WatchStream::new(self.generation_tx.subscribe())
    }

    /// Refresh in the background every `poll_interval_secs`
    ///
    /// Polling runs until the returned handle is stopped or dropped; the
    /// task holds the monitor alive until then. Failures are logged by
    /// `refresh` and do not stop the loop.
    pub fn spawn_polling(self: Arc<Self>) -> PollingHandle {
        let period = self.config.poll_interval();

        tracing::info!(
            source = %self.source.name(),
            interval_secs = self.config.poll_interval_secs,
            "Log polling started"
        );

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            // The first tick completes immediately
            if !self.config.refresh_on_start {
                ticker.tick().await;
            }

            loop {
                ticker.tick().await;
                let _ = self.refresh().await;
            }
        });

        PollingHandle { task }
    }

    fn bump(&self, state: &mut MonitorState) {
        state.generation += 1;
        self.generation_tx.send_replace(state.generation);
    }
}
