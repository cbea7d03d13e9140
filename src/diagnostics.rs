use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

/// Raised when a write is rejected by access policy. Kept apart from the
/// message shown to the end user.
#[derive(Clone, Debug, Serialize)]
pub struct PermissionDenied {
    pub path: String,
    pub operation: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_resource_data: Option<Value>,
    pub occurred_at: DateTime<Utc>,
}

impl PermissionDenied {
    pub fn new(path: impl Into<String>, operation: &'static str) -> Self {
        Self {
            path: path.into(),
            operation,
            request_resource_data: None,
            occurred_at: Utc::now(),
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.request_resource_data = Some(data);
        self
    }
}

/// Process-wide channel for permission-denied events.
#[derive(Clone, Debug)]
pub struct Diagnostics {
    sender: broadcast::Sender<PermissionDenied>,
}

impl Diagnostics {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn report(&self, event: PermissionDenied) {
        log::warn!(
            "Permission denied: {} on {}",
            event.operation,
            event.path
        );
        // No subscribers is the normal case outside a debugging session.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PermissionDenied> {
        self.sender.subscribe()
    }
}
