use serde::{Deserialize, Serialize};

/// Epoch milliseconds, the timestamp unit used across check records and
/// log records.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Probe protocol for a check target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Http => write!(f, "http"),
            Protocol::Https => write!(f, "https"),
        }
    }
}

/// HTTP verb used for the outbound probe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl ProbeMethod {
    /// Uppercase verb, as it appears in alert messages.
    pub fn as_upper(&self) -> &'static str {
        match self {
            ProbeMethod::Get => "GET",
            ProbeMethod::Post => "POST",
            ProbeMethod::Put => "PUT",
            ProbeMethod::Delete => "DELETE",
        }
    }
}

/// Reachability state of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Up,
    Down,
}

impl std::fmt::Display for CheckState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckState::Up => write!(f, "up"),
            CheckState::Down => write!(f, "down"),
        }
    }
}

/// A user-configured endpoint-monitoring rule.
///
/// Field names on the wire are camelCase, matching the stored record
/// format. `url` is scheme-less; the probe target is `protocol://url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Check {
    pub id: String,
    pub user_phone: String,
    pub protocol: Protocol,
    pub url: String,
    pub method: ProbeMethod,
    pub success_codes: Vec<u16>,
    pub timeout_seconds: u64,
    pub state: CheckState,
    /// Epoch millis of the most recent probe, absent before the first one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<i64>,
}

impl Check {
    /// Full probe target, e.g. `https://example.com/path?q=1`.
    pub fn target(&self) -> String {
        format!("{}://{}", self.protocol, self.url)
    }
}

/// Result of a single probe attempt. Exactly one is produced per attempt,
/// whichever completion fires first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// A response was received; carries the HTTP status, success or not.
    Status(u16),
    /// The connection or request failed before any response.
    NetworkError(String),
    /// The configured timeout elapsed first.
    TimedOut,
}

impl CheckOutcome {
    pub fn response_code(&self) -> Option<u16> {
        match self {
            CheckOutcome::Status(code) => Some(*code),
            _ => None,
        }
    }

    pub fn error_detail(&self) -> Option<&str> {
        match self {
            CheckOutcome::Status(_) => None,
            CheckOutcome::NetworkError(detail) => Some(detail),
            CheckOutcome::TimedOut => Some("timeout"),
        }
    }
}

/// Serialized form of a [`CheckOutcome`] inside a log record: an error
/// detail or a response code, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_code: Option<u16>,
}

impl From<&CheckOutcome> for OutcomeRecord {
    fn from(outcome: &CheckOutcome) -> Self {
        Self {
            error: outcome.error_detail().map(str::to_owned),
            response_code: outcome.response_code(),
        }
    }
}

/// One line of a check's probe log, appended per attempt and never
/// mutated. `check` is the pre-update snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub check: Check,
    pub outcome: OutcomeRecord,
    pub state: CheckState,
    pub alert: bool,
    pub time: i64,
}
