//! Bounded, insertion-ordered alert log.
//!
//! `AlertStore` keeps at most `capacity` alerts in a `VecDeque` behind a
//! `Mutex`. Inserting past the cap evicts from the front, so the oldest
//! insertion always goes first. Queries walk the deque from the back and
//! therefore always return newest-first.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use tracing::{debug, info};

use hamlet_contracts::{
    alert::{Alert, AlertId, AlertQuery, AlertSeverity, AlertType},
    config::AlertStoreConfig,
};
use hamlet_core::clock::Clock;

pub struct AlertStore {
    capacity: usize,
    clock: Arc<dyn Clock>,
    alerts: Mutex<VecDeque<Alert>>,
}

impl AlertStore {
    /// Create an empty store. A zero capacity is raised to one.
    pub fn new(config: &AlertStoreConfig, clock: Arc<dyn Clock>) -> Self {
        let capacity = config.capacity.max(1);
        Self {
            capacity,
            clock,
            alerts: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Append a new alert stamped with the store's clock and return a copy.
    pub fn create_alert(
        &self,
        alert_type: AlertType,
        severity: AlertSeverity,
        title: impl Into<String>,
        message: impl Into<String>,
        data: serde_json::Value,
    ) -> Alert {
        let alert = Alert {
            id: AlertId::new(),
            alert_type,
            severity,
            title: title.into(),
            message: message.into(),
            data,
            timestamp: self.clock.now(),
            acknowledged: false,
        };

        let mut alerts = self.alerts.lock().expect("alert store lock poisoned");
        while alerts.len() >= self.capacity {
            alerts.pop_front();
        }
        alerts.push_back(alert.clone());

        if severity == AlertSeverity::Critical {
            info!(alert_type = ?alert_type, title = %alert.title, "critical alert raised");
        } else {
            debug!(alert_type = ?alert_type, severity = ?severity, title = %alert.title, "alert raised");
        }

        alert
    }

    /// Alerts matching `query`, newest first, at most `query.limit` of them.
    pub fn get_alerts(&self, query: &AlertQuery) -> Vec<Alert> {
        let limit = query.limit.unwrap_or(usize::MAX);
        let alerts = self.alerts.lock().expect("alert store lock poisoned");
        alerts
            .iter()
            .rev()
            .filter(|alert| query.matches(alert))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Mark an alert acknowledged. Returns `false` for an unknown id.
    pub fn acknowledge(&self, id: &AlertId) -> bool {
        let mut alerts = self.alerts.lock().expect("alert store lock poisoned");
        match alerts.iter_mut().find(|alert| &alert.id == id) {
            Some(alert) => {
                alert.acknowledged = true;
                true
            }
            None => {
                debug!(alert_id = %id.0, "acknowledge for unknown alert ignored");
                false
            }
        }
    }

    pub fn unacknowledged_count(&self) -> usize {
        let alerts = self.alerts.lock().expect("alert store lock poisoned");
        alerts.iter().filter(|alert| !alert.acknowledged).count()
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().expect("alert store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.alerts.lock().expect("alert store lock poisoned").clear();
    }
}
