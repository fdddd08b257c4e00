//! User-facing alerts (toast notifications)
//!
//! Workflow code never reaches for a global notification store. It is handed
//! an [`AlertSink`] and raises [`Alert`]s through it. [`AlertBus`] is the
//! default sink: a `tokio::sync::broadcast` channel that any number of UI
//! subscribers can listen to.
//!
//! ```text
//! InvoiceDialog::save() ──▶ AlertSink::raise() ──▶ broadcast channel ──▶ toast renderer
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Visual severity of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Info,
    Warn,
    Error,
}

/// A notification shown to the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity,
            title: title.into(),
            message: message.into(),
            raised_at: Utc::now(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, title, message)
    }
}

/// Destination for user-facing alerts
pub trait AlertSink: Send + Sync {
    fn raise(&self, alert: Alert);
}

/// Broadcast-based alert sink
///
/// Cheap to clone and shareable across threads. Alerts raised while nobody
/// is subscribed are dropped.
#[derive(Debug, Clone)]
pub struct AlertBus {
    sender: broadcast::Sender<Alert>,
}

impl AlertBus {
    /// Create a new bus buffering up to `capacity` alerts per slow subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an alert, returning the number of subscribers reached
    pub fn publish(&self, alert: Alert) -> usize {
        self.sender.send(alert).unwrap_or(0)
    }

    /// Subscribe to alerts raised from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Alert> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for AlertBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl AlertSink for AlertBus {
    fn raise(&self, alert: Alert) {
        let title = alert.title.clone();
        let severity = alert.severity;
        if self.publish(alert) == 0 {
            tracing::debug!(%title, ?severity, "alert raised with no subscribers");
        }
    }
}
