//! Shared `ureq` plumbing.

use std::time::Duration;

use serde_json::Value;

/// Why a JSON exchange did not produce a body.
#[derive(Debug)]
pub(crate) enum TransportError {
    /// No HTTP response at all (refused, DNS, TLS, timeout).
    Io(String),
    /// The server answered with a non-2xx status.
    Status { status: u16, body: String },
    /// 2xx, but the body was not JSON.
    Body(String),
}

/// Build an agent whose every call is bounded by `timeout`.
///
/// Status codes are not turned into errors so that error bodies can be
/// read and logged.
pub(crate) fn agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build();
    ureq::Agent::new_with_config(config)
}

pub(crate) fn read_json(
    response: ureq::http::Response<ureq::Body>,
) -> Result<Value, TransportError> {
    let status = response.status().as_u16();
    let body = response
        .into_body()
        .read_to_string()
        .map_err(|e| TransportError::Io(format!("failed to read response body: {}", e)))?;
    if !(200..300).contains(&status) {
        return Err(TransportError::Status { status, body });
    }
    serde_json::from_str(&body)
        .map_err(|e| TransportError::Body(format!("failed to parse response as JSON: {}", e)))
}

pub(crate) fn get_json(agent: &ureq::Agent, url: &str) -> Result<Value, TransportError> {
    let response = agent
        .get(url)
        .header("Accept", "application/json")
        .call()
        .map_err(|e| TransportError::Io(e.to_string()))?;
    read_json(response)
}

/// Join a base URL and an absolute path without doubling slashes.
pub(crate) fn join(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
