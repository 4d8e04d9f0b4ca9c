//! Alert triage: category and severity ladders for blocked entries
//!
//! Both ladders read the same two text signals (`reason`, `stopped_by`),
//! lower-cased, and stop at the first matching rung. They are evaluated
//! independently: a category never feeds into a severity or the other
//! way round. Rung order decides the outcome for text matching several
//! keywords, so it must not be rearranged.

use crate::types::{Alert, AlertType, LogEntry, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Assign an alert category from the reason and stopping stage
pub fn categorize(reason: &str, stopped_by: &str) -> AlertType {
    let reason = reason.to_lowercase();
    let stopped_by = stopped_by.to_lowercase();

    if reason.contains("canary") || stopped_by.contains("canary") {
        AlertType::Canary
    } else if contains_any(&reason, &["injection", "jailbreak"]) || stopped_by.contains("jailbreak")
    {
        AlertType::Jailbreak
    } else if contains_any(&reason, &["pii", "leak", "data leak"]) {
        AlertType::Leak
    } else if contains_any(&reason, &["suspicious", "anomaly", "unusual"]) {
        AlertType::Suspicious
    } else {
        AlertType::Other
    }
}

/// Assign a severity from the reason and stopping stage
pub fn severity(reason: &str, stopped_by: &str) -> Severity {
    let reason = reason.to_lowercase();
    let stopped_by = stopped_by.to_lowercase();

    if contains_any(&reason, &["injection", "jailbreak", "data leak"]) {
        Severity::Critical
    } else if contains_any(&reason, &["pii", "canary"]) || stopped_by.contains("canary") {
        Severity::High
    } else if contains_any(&reason, &["suspicious", "anomaly"]) {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Turn a blocked entry into an alert; other entries yield `None`
pub fn triage(entry: &LogEntry) -> Option<Alert> {
    if !entry.is_blocked() {
        return None;
    }

    let reason = entry.reason_text();
    let stopped_by = entry.stopped_by_text();

    Some(Alert {
        alert_type: categorize(reason, stopped_by),
        severity: severity(reason, stopped_by),
        entry: entry.clone(),
    })
}

/// Derive the full alert set from a log collection, preserving order
pub fn triage_all(logs: &[LogEntry]) -> Vec<Alert> {
    logs.iter().filter_map(triage).collect()
}

/// Alert counts per severity and per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSummary {
    pub total: u64,
    pub by_severity: BTreeMap<Severity, u64>,
    pub by_type: BTreeMap<AlertType, u64>,
}

impl AlertSummary {
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        let mut summary = Self::default();
        for alert in alerts {
            *summary.by_severity.entry(alert.severity).or_insert(0) += 1;
            *summary.by_type.entry(alert.alert_type).or_insert(0) += 1;
            summary.total += 1;
        }
        summary
    }

    /// Count for one severity, zero when absent
    pub fn severity_count(&self, severity: Severity) -> u64 {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }

    /// Count for one category, zero when absent
    pub fn type_count(&self, alert_type: AlertType) -> u64 {
        self.by_type.get(&alert_type).copied().unwrap_or(0)
    }
}
