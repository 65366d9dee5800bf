//! HV session API client.

use std::time::Duration;

use hvlink_core::session::parse_listing;
use hvlink_core::{ConnectorConfig, Session, SessionSource, SourceError};
use serde_json::Value;

use crate::transport::{self, TransportError};

pub struct HvClient {
    agent: ureq::Agent,
    base_url: String,
}

impl HvClient {
    pub fn new(config: &ConnectorConfig) -> Self {
        Self::with_base_url(&config.hv_api_url, config.request_timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Self {
        HvClient {
            agent: transport::agent(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /api/sessions`.
    pub fn list_sessions(&self) -> Result<Vec<Session>, SourceError> {
        let url = transport::join(&self.base_url, "/api/sessions");
        let body = self.get(&url)?;
        parse_listing(&url, &body)
    }

    /// `GET /api/sessions/{id}`. A 404 is `Ok(None)`.
    pub fn get_session(&self, session_id: &str) -> Result<Option<Session>, SourceError> {
        let url = transport::join(&self.base_url, &format!("/api/sessions/{}", session_id));
        let body = match self.get(&url) {
            Ok(body) => body,
            Err(SourceError::Status { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        let data = body.get("data").cloned().unwrap_or(Value::Null);
        serde_json::from_value(data)
            .map(Some)
            .map_err(|e| SourceError::Malformed {
                url,
                message: e.to_string(),
            })
    }

    /// `GET /api/health`, returning the `data` object.
    pub fn health(&self) -> Result<Value, SourceError> {
        let url = transport::join(&self.base_url, "/api/health");
        let body = self.get(&url)?;
        Ok(body.get("data").cloned().unwrap_or(Value::Null))
    }

    fn get(&self, url: &str) -> Result<Value, SourceError> {
        tracing::debug!(url, "GET");
        transport::get_json(&self.agent, url).map_err(|e| match e {
            TransportError::Io(message) => SourceError::Unreachable {
                url: url.to_string(),
                message,
            },
            TransportError::Status { status, .. } => SourceError::Status {
                url: url.to_string(),
                status,
            },
            TransportError::Body(message) => SourceError::Malformed {
                url: url.to_string(),
                message,
            },
        })
    }
}

impl SessionSource for HvClient {
    fn list_sessions(&self) -> Result<Vec<Session>, SourceError> {
        HvClient::list_sessions(self)
    }
}
