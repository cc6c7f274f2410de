//! Up/down state machine and the side effects of one probe attempt.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::alerts::AlertDispatcher;
use crate::store::RecordStore;
use crate::store::logs::LogStore;

use super::types::{Check, CheckOutcome, CheckState, LogRecord, OutcomeRecord, now_millis};

const CHECKS_COLLECTION: &str = "checks";

/// Pure transition function: up iff a response was received and its status
/// is one of the check's success codes.
pub fn next_state(outcome: &CheckOutcome, success_codes: &[u16]) -> CheckState {
    match outcome {
        CheckOutcome::Status(code) if success_codes.contains(code) => CheckState::Up,
        _ => CheckState::Down,
    }
}

/// An alert is warranted only on a state transition, and never on a
/// check's first-ever evaluation (no meaningful previous state exists).
pub fn alert_warranted(check: &Check, new_state: CheckState) -> bool {
    check.last_checked.is_some() && check.state != new_state
}

/// Applies a probe outcome: appends the log record, persists the updated
/// check, and dispatches an alert when warranted.
///
/// The three steps run in that order but are independent failure domains;
/// a failed step is logged and the remaining steps still run. Partial
/// completion (log written but persistence failed) is accepted.
pub struct OutcomeProcessor {
    records: Arc<dyn RecordStore>,
    logs: Arc<dyn LogStore>,
    dispatcher: AlertDispatcher,
}

impl OutcomeProcessor {
    pub fn new(
        records: Arc<dyn RecordStore>,
        logs: Arc<dyn LogStore>,
        dispatcher: AlertDispatcher,
    ) -> Self {
        Self { records, logs, dispatcher }
    }

    pub async fn process(&self, check: Check, outcome: CheckOutcome) {
        let state = next_state(&outcome, &check.success_codes);
        let alert = alert_warranted(&check, state);
        let now = now_millis();

        let record = LogRecord {
            check: check.clone(),
            outcome: OutcomeRecord::from(&outcome),
            state,
            alert,
            time: now,
        };
        match serde_json::to_string(&record) {
            Ok(line) => {
                if let Err(e) = self.logs.append(&check.id, &line).await {
                    warn!(check = %check.id, "could not append probe log record: {e}");
                }
            }
            Err(e) => warn!(check = %check.id, "could not encode probe log record: {e}"),
        }

        let mut updated = check;
        updated.state = state;
        updated.last_checked = Some(now);

        match serde_json::to_value(&updated) {
            Ok(value) => {
                if let Err(e) = self.records.update(CHECKS_COLLECTION, &updated.id, &value).await {
                    warn!(check = %updated.id, "could not persist check state: {e}");
                }
            }
            Err(e) => warn!(check = %updated.id, "could not encode check record: {e}"),
        }

        if alert {
            self.dispatcher.notify_status_change(&updated).await;
        } else {
            debug!(check = %updated.id, state = %state, "state unchanged or first probe, no alert");
        }
    }
}
