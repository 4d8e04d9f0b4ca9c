//! Core types for the a3s-watch system
//!
//! Log records come from an external backend whose field casing and
//! presence are not guaranteed. Every optional field therefore has a
//! documented default: absent text reads as `""`, an unrecognized
//! decision reads as unset. Nothing in here fails on a sparse record.

use crate::error::WatchError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Authenticated identity with granted permission and role tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend user identifier
    pub id: String,

    /// Display name
    #[serde(default)]
    pub username: String,

    /// Permission tokens (e.g., "read", "create", "admin")
    #[serde(default)]
    pub permissions: BTreeSet<String>,

    /// Role tokens (e.g., "analyst", "auditor")
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl User {
    /// Create a user with no permissions or roles
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            permissions: BTreeSet::new(),
            roles: BTreeSet::new(),
        }
    }

    /// Grant a permission token
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    /// Grant a role token
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }
}

/// Backend verdict on an analyzed query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Allow,
    Block,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "ALLOW",
            Decision::Block => "BLOCK",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "allow" => Ok(Decision::Allow),
            "block" => Ok(Decision::Block),
            _ => Err(WatchError::InvalidFilter {
                field: "decision",
                value: s.to_string(),
            }),
        }
    }
}

/// Log view categories selectable in the logs list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// Entries carrying a non-empty query text
    Query,
    /// Entries whose event type is "ingestion"
    Ingestion,
    /// Blocked entries
    Violation,
    /// Entries stopped by a retrieval stage
    Retrieval,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Query => "query",
            LogKind::Ingestion => "ingestion",
            LogKind::Violation => "violation",
            LogKind::Retrieval => "retrieval",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogKind {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "query" => Ok(LogKind::Query),
            "ingestion" => Ok(LogKind::Ingestion),
            "violation" => Ok(LogKind::Violation),
            "retrieval" => Ok(LogKind::Retrieval),
            _ => Err(WatchError::InvalidFilter {
                field: "type",
                value: s.to_string(),
            }),
        }
    }
}

/// Alert category assigned by the category ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Canary,
    Jailbreak,
    Leak,
    Suspicious,
    Other,
}

impl AlertType {
    /// All categories in ladder priority order
    pub const ALL: [AlertType; 5] = [
        AlertType::Canary,
        AlertType::Jailbreak,
        AlertType::Leak,
        AlertType::Suspicious,
        AlertType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Canary => "canary",
            AlertType::Jailbreak => "jailbreak",
            AlertType::Leak => "leak",
            AlertType::Suspicious => "suspicious",
            AlertType::Other => "other",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertType {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "canary" => Ok(AlertType::Canary),
            "jailbreak" => Ok(AlertType::Jailbreak),
            "leak" => Ok(AlertType::Leak),
            "suspicious" => Ok(AlertType::Suspicious),
            "other" => Ok(AlertType::Other),
            _ => Err(WatchError::InvalidFilter {
                field: "alertType",
                value: s.to_string(),
            }),
        }
    }
}

/// Alert severity, ordered from `Low` to `Critical`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All severities, most severe first
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(WatchError::InvalidFilter {
                field: "severity",
                value: s.to_string(),
            }),
        }
    }
}

/// Epoch timestamps at or above this magnitude are read as milliseconds
pub const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// One analyzed query or pipeline event as reported by the backend
///
/// Wire field names follow the backend (`stopped_by`, `type`), not the
/// camelCase used elsewhere in this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Opaque identifier; numeric ids are kept as their decimal text
    #[serde(default, deserialize_with = "opaque_id")]
    pub id: String,

    /// Query text submitted by the user
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub query: Option<String>,

    /// Risk score assigned by the backend; numeric strings are accepted
    #[serde(
        default,
        deserialize_with = "lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub score: Option<f64>,

    /// Serialized point in time, usually RFC 3339 or epoch digits
    #[serde(default, deserialize_with = "text_or_empty")]
    pub timestamp: String,

    /// Verdict; unrecognized values are read as unset
    #[serde(
        default,
        deserialize_with = "lenient_decision",
        skip_serializing_if = "Option::is_none"
    )]
    pub decision: Option<Decision>,

    /// Classification hint
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub reason: Option<String>,

    /// Pipeline stage that stopped the query
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub stopped_by: Option<String>,

    /// Event type (e.g., "ingestion")
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
}

impl LogEntry {
    /// Create an entry with only an id set
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    pub fn with_decision(mut self, decision: Decision) -> Self {
        self.decision = Some(decision);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_stopped_by(mut self, stopped_by: impl Into<String>) -> Self {
        self.stopped_by = Some(stopped_by.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Query text, or `""` when absent
    pub fn query_text(&self) -> &str {
        self.query.as_deref().unwrap_or_default()
    }

    /// Reason text, or `""` when absent
    pub fn reason_text(&self) -> &str {
        self.reason.as_deref().unwrap_or_default()
    }

    /// Stopping stage, or `""` when absent
    pub fn stopped_by_text(&self) -> &str {
        self.stopped_by.as_deref().unwrap_or_default()
    }

    /// Event type, or `""` when absent
    pub fn kind_text(&self) -> &str {
        self.kind.as_deref().unwrap_or_default()
    }

    pub fn is_blocked(&self) -> bool {
        self.decision == Some(Decision::Block)
    }

    /// Timestamp parsed as RFC 3339 or as Unix epoch seconds/milliseconds
    ///
    /// Epoch values above `EPOCH_MILLIS_THRESHOLD` are read as milliseconds.
    pub fn parsed_timestamp(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(ts.with_timezone(&chrono::Utc));
        }

        let epoch: i64 = self.timestamp.trim().parse().ok()?;
        if epoch.abs() >= EPOCH_MILLIS_THRESHOLD {
            chrono::DateTime::from_timestamp_millis(epoch)
        } else {
            chrono::DateTime::from_timestamp(epoch, 0)
        }
    }
}

fn opaque_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

/// Scalars become their text; null, arrays and objects are absent
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(value @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_))) => {
            Some(value.to_string())
        }
        _ => None,
    })
}

fn text_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

fn lenient_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let score = match raw {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(score.filter(|score| score.is_finite()))
}

fn lenient_decision<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Decision>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| s.parse().ok()))
}

/// A blocked log entry enriched with category and severity
///
/// Derived on every refresh and never stored apart from its entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(flatten)]
    pub entry: LogEntry,

    #[serde(rename = "alertType")]
    pub alert_type: AlertType,

    pub severity: Severity,
}

/// A filter criterion that either admits everything or one value
///
/// Serialized as `"all"` or the token of the selected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T> From<T> for Selection<T> {
    fn from(value: T) -> Self {
        Selection::Only(value)
    }
}

impl<T: PartialEq> Selection<T> {
    /// Whether `value` passes this criterion
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str("all"),
            Selection::Only(value) => value.fmt(f),
        }
    }
}

impl<T: FromStr<Err = WatchError>> FromStr for Selection<T> {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Selection::All)
        } else {
            s.parse().map(Selection::Only)
        }
    }
}

impl<T: fmt::Display> Serialize for Selection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, T: FromStr<Err = WatchError>> Deserialize<'de> for Selection<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// User-selected filter criteria for the logs and alerts views
///
/// Only changed through [`FilterState::apply`]; never inferred.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Log category (logs view only)
    #[serde(rename = "type", default)]
    pub log_type: Selection<LogKind>,

    /// Decision (logs view only)
    #[serde(default)]
    pub decision: Selection<Decision>,

    /// Free-text search applied to both views
    #[serde(default)]
    pub search: String,

    /// Alert category (alerts view only)
    #[serde(default)]
    pub alert_type: Selection<AlertType>,

    /// Alert severity (alerts view only)
    #[serde(default)]
    pub severity: Selection<Severity>,
}

impl FilterState {
    /// Merge the fields present in `update`, returning whether anything changed
    pub fn apply(&mut self, update: FilterUpdate) -> bool {
        let before = self.clone();

        if let Some(log_type) = update.log_type {
            self.log_type = log_type;
        }
        if let Some(decision) = update.decision {
            self.decision = decision;
        }
        if let Some(search) = update.search {
            self.search = search;
        }
        if let Some(alert_type) = update.alert_type {
            self.alert_type = alert_type;
        }
        if let Some(severity) = update.severity {
            self.severity = severity;
        }

        *self != before
    }

    /// Restore every criterion to "all" and clear the search
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Partial filter change; absent fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterUpdate {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub log_type: Option<Selection<LogKind>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<Selection<Decision>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_type: Option<Selection<AlertType>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Selection<Severity>>,
}

impl FilterUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_type(mut self, log_type: impl Into<Selection<LogKind>>) -> Self {
        self.log_type = Some(log_type.into());
        self
    }

    pub fn with_decision(mut self, decision: impl Into<Selection<Decision>>) -> Self {
        self.decision = Some(decision.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_alert_type(mut self, alert_type: impl Into<Selection<AlertType>>) -> Self {
        self.alert_type = Some(alert_type.into());
        self
    }

    pub fn with_severity(mut self, severity: impl Into<Selection<Severity>>) -> Self {
        self.severity = Some(severity.into());
        self
    }
}
