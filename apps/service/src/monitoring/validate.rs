//! Sanity checking of raw check records before they reach the probe
//! executor.
//!
//! Records come out of the store as untyped JSON: freshly created checks
//! are missing `state`/`lastChecked`, and a corrupted record can have any
//! field mistyped. Each field is re-derived from the raw value with its
//! exact validity predicate; a required field that fails rejects the whole
//! record (it is dropped for this cycle and retried on the next one),
//! while operational fields fall back to safe defaults.

use serde_json::Value;

use crate::error::ValidationError;

use super::types::{Check, CheckState, ProbeMethod, Protocol};

/// Check ids are fixed-length opaque strings.
pub const CHECK_ID_LEN: usize = 20;

/// Allowed probe timeout range, in seconds.
pub const MIN_TIMEOUT_SECONDS: u64 = 1;
pub const MAX_TIMEOUT_SECONDS: u64 = 5;

/// Validate and repair a raw check record into a well-formed [`Check`].
pub fn normalize_check(raw: &Value) -> Result<Check, ValidationError> {
    let id = string_field(raw, "id")
        .filter(|s| s.chars().count() == CHECK_ID_LEN)
        .ok_or(ValidationError::InvalidField("id"))?;

    let user_phone = string_field(raw, "userPhone")
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::InvalidField("userPhone"))?;

    let protocol = match string_field(raw, "protocol") {
        Some("http") => Protocol::Http,
        Some("https") => Protocol::Https,
        _ => return Err(ValidationError::InvalidField("protocol")),
    };

    let url = string_field(raw, "url")
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::InvalidField("url"))?;

    let method = match string_field(raw, "method") {
        Some("get") => ProbeMethod::Get,
        Some("post") => ProbeMethod::Post,
        Some("put") => ProbeMethod::Put,
        Some("delete") => ProbeMethod::Delete,
        _ => return Err(ValidationError::InvalidField("method")),
    };

    let success_codes = raw
        .get("successCodes")
        .and_then(Value::as_array)
        .filter(|codes| !codes.is_empty())
        .and_then(|codes| {
            codes
                .iter()
                .map(|code| code.as_u64().and_then(|n| u16::try_from(n).ok()))
                .collect::<Option<Vec<u16>>>()
        })
        .ok_or(ValidationError::InvalidField("successCodes"))?;

    let timeout_seconds = raw
        .get("timeoutSeconds")
        .and_then(Value::as_u64)
        .filter(|t| (MIN_TIMEOUT_SECONDS..=MAX_TIMEOUT_SECONDS).contains(t))
        .ok_or(ValidationError::InvalidField("timeoutSeconds"))?;

    // Operational fields may be absent on a check the workers have never
    // seen; default rather than reject.
    let state = match string_field(raw, "state") {
        Some("up") => CheckState::Up,
        _ => CheckState::Down,
    };

    let last_checked = raw.get("lastChecked").and_then(Value::as_i64).filter(|t| *t > 0);

    Ok(Check {
        id: id.to_string(),
        user_phone: user_phone.to_string(),
        protocol,
        url: url.to_string(),
        method,
        success_codes,
        timeout_seconds,
        state,
        last_checked,
    })
}

fn string_field<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    raw.get(key).and_then(Value::as_str)
}
