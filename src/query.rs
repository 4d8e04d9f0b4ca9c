//! Log query engine: filtered views over logs and derived alerts
//!
//! Every criterion in a [`FilterState`] is an independent predicate and
//! they compose with AND. A criterion set to "all" (or an empty search)
//! contributes nothing. Results borrow from the source slice in source
//! order; the source is never reordered or modified.

use crate::types::{Alert, Decision, FilterState, LogEntry, LogKind, Selection};
use serde::{Deserialize, Serialize};

/// Whether an entry belongs to a log category
pub fn matches_kind(entry: &LogEntry, kind: LogKind) -> bool {
    match kind {
        LogKind::Query => !entry.query_text().is_empty(),
        LogKind::Ingestion => entry.kind_text() == "ingestion",
        LogKind::Violation => entry.is_blocked(),
        LogKind::Retrieval => entry.stopped_by_text().to_lowercase().contains("retrieval"),
    }
}

/// Whether an entry passes a decision criterion
///
/// Entries with no decision only pass "all".
pub fn matches_decision(entry: &LogEntry, decision: Selection<Decision>) -> bool {
    match decision {
        Selection::All => true,
        Selection::Only(wanted) => entry.decision == Some(wanted),
    }
}

/// Case-insensitive substring search over query, reason, and stopping stage
///
/// An empty search matches everything.
pub fn matches_search(entry: &LogEntry, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    [entry.query_text(), entry.reason_text(), entry.stopped_by_text()]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Entries for the logs view: category, decision, and search criteria
pub fn filtered_logs<'a>(logs: &'a [LogEntry], filters: &FilterState) -> Vec<&'a LogEntry> {
    logs.iter()
        .filter(|entry| match filters.log_type {
            Selection::All => true,
            Selection::Only(kind) => matches_kind(entry, kind),
        })
        .filter(|entry| matches_decision(entry, filters.decision))
        .filter(|entry| matches_search(entry, &filters.search))
        .collect()
}

/// Alerts for the alerts view: search, category, and severity criteria
///
/// The logs-only criteria (category of log, decision) do not apply here.
pub fn filtered_alerts<'a>(alerts: &'a [Alert], filters: &FilterState) -> Vec<&'a Alert> {
    alerts
        .iter()
        .filter(|alert| matches_search(&alert.entry, &filters.search))
        .filter(|alert| filters.alert_type.admits(&alert.alert_type))
        .filter(|alert| filters.severity.admits(&alert.severity))
        .collect()
}

/// Decision counts over a log collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub total: u64,
    pub allowed: u64,
    pub blocked: u64,
    pub undecided: u64,
}

impl LogStats {
    pub fn from_logs<'a>(logs: impl IntoIterator<Item = &'a LogEntry>) -> Self {
        let mut stats = Self::default();
        for entry in logs {
            match entry.decision {
                Some(Decision::Allow) => stats.allowed += 1,
                Some(Decision::Block) => stats.blocked += 1,
                None => stats.undecided += 1,
            }
            stats.total += 1;
        }
        stats
    }
}
