//! Operational alert types.
//!
//! Alerts are the operator-facing channel: everything else is logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier of a stored alert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(pub uuid::Uuid);

impl AlertId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for AlertId {
    fn default() -> Self {
        Self::new()
    }
}

/// The closed set of alert categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Launch,
    Rug,
    Pump,
    Dump,
    Milestone,
    Anomaly,
    FeeReminder,
    Trade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    /// Free-form structured context for the alert.
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub acknowledged: bool,
}

/// Filters for querying the alert store. All filters are conjunctive.
///
/// `limit: None` means "no limit"; `Some(0)` yields an empty result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertQuery {
    pub alert_type: Option<AlertType>,
    pub severity: Option<AlertSeverity>,
    pub unacknowledged_only: bool,
    pub limit: Option<usize>,
}

impl AlertQuery {
    pub fn matches(&self, alert: &Alert) -> bool {
        self.alert_type.is_none_or(|t| alert.alert_type == t)
            && self.severity.is_none_or(|s| alert.severity == s)
            && (!self.unacknowledged_only || !alert.acknowledged)
    }
}
