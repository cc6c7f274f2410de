use std::time::Duration;

use anyhow::Result;
use reqwest::Method;
use url::Url;

use super::types::{Check, CheckOutcome, ProbeMethod};

/// Executes the outbound probe request for a check.
///
/// Exactly one request is issued per call and exactly one outcome is
/// returned, whichever completion fires first: a response (any status), a
/// transport error, or the check's timeout. The per-request timeout is the
/// single-resolution latch; a late completion of a timed-out request is
/// discarded by the runtime, never double-processed. No retries.
pub struct ProbeExecutor {
    client: reqwest::Client,
}

impl ProbeExecutor {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    /// Perform one probe attempt against the check's target.
    pub async fn probe(&self, check: &Check) -> CheckOutcome {
        let target = match Url::parse(&check.target()) {
            Ok(target) => target,
            Err(e) => return CheckOutcome::NetworkError(format!("invalid target url: {e}")),
        };

        let request = self
            .client
            .request(request_method(check.method), target)
            .timeout(Duration::from_secs(check.timeout_seconds));

        match request.send().await {
            Ok(response) => CheckOutcome::Status(response.status().as_u16()),
            Err(e) if e.is_timeout() => CheckOutcome::TimedOut,
            Err(e) => CheckOutcome::NetworkError(e.to_string()),
        }
    }
}

fn request_method(method: ProbeMethod) -> Method {
    match method {
        ProbeMethod::Get => Method::GET,
        ProbeMethod::Post => Method::POST,
        ProbeMethod::Put => Method::PUT,
        ProbeMethod::Delete => Method::DELETE,
    }
}
