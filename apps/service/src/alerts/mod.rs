//! Status-change notifications.
//!
//! Alerting is best-effort and fire-and-forget: a gateway failure is
//! logged, never retried, and never blocks the owning check's persisted
//! state update.

pub mod twilio;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::AlertError;
use crate::monitoring::types::Check;

/// Sends a short text message to a recipient. Remote call with no retry or
/// delivery guarantee.
#[async_trait]
pub trait AlertGateway: Send + Sync {
    async fn send(&self, recipient: &str, message: &str) -> Result<(), AlertError>;
}

/// Human-readable status-change notice for a check's owner.
pub fn status_change_message(check: &Check) -> String {
    format!(
        "Alert, your check for {} {}://{} is currently {}",
        check.method.as_upper(),
        check.protocol,
        check.url,
        check.state
    )
}

/// Formats and delivers status-change notices via the alert gateway.
pub struct AlertDispatcher {
    gateway: Arc<dyn AlertGateway>,
}

impl AlertDispatcher {
    pub fn new(gateway: Arc<dyn AlertGateway>) -> Self {
        Self { gateway }
    }

    /// Notify the check's owner of its current state. Failures are logged
    /// and swallowed.
    pub async fn notify_status_change(&self, check: &Check) {
        let message = status_change_message(check);
        match self.gateway.send(&check.user_phone, &message).await {
            Ok(()) => debug!(check = %check.id, "status change alert delivered"),
            Err(e) => warn!(check = %check.id, "could not deliver status change alert: {e}"),
        }
    }
}
