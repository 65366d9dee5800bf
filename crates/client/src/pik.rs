//! PIK ingest and user-directory client.

use std::time::Duration;

use hvlink_core::{
    ConnectorConfig, DeliveryFailure, DirectoryError, DirectoryUser, EventSink, IngestReceipt,
    ProgressionEvent, UserDirectory,
};
use serde_json::Value;

use crate::transport::{self, TransportError};

/// Header carrying the PIK source API key.
const API_KEY_HEADER: &str = "X-PIK-API-Key";

pub struct PikClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

impl PikClient {
    pub fn new(config: &ConnectorConfig) -> Self {
        Self::with_base_url(
            &config.pik_api_url,
            &config.pik_api_key,
            config.request_timeout,
        )
    }

    pub fn with_base_url(base_url: &str, api_key: &str, timeout: Duration) -> Self {
        PikClient {
            agent: transport::agent(timeout),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// `POST /api/ingest` with the event as the JSON body.
    pub fn ingest(&self, event: &ProgressionEvent) -> Result<IngestReceipt, DeliveryFailure> {
        let url = transport::join(&self.base_url, "/api/ingest");
        tracing::debug!(
            url = %url,
            event_type = %event.event_type,
            root_id = %event.root_id,
            "POST"
        );
        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json")
            .header(API_KEY_HEADER, &self.api_key)
            .send_json(event)
            .map_err(|e| DeliveryFailure {
                url: url.clone(),
                status: None,
                message: e.to_string(),
            })?;

        let body = transport::read_json(response).map_err(|e| match e {
            TransportError::Io(message) | TransportError::Body(message) => DeliveryFailure {
                url: url.clone(),
                status: None,
                message,
            },
            TransportError::Status { status, body } => DeliveryFailure {
                url: url.clone(),
                status: Some(status),
                message: format!("HTTP {} {}", status, body.trim()),
            },
        })?;
        IngestReceipt::from_response(&url, &body)
    }

    /// `GET /api/users`, the `{status, data: [user]}` directory listing.
    pub fn list_users(&self) -> Result<Vec<DirectoryUser>, DirectoryError> {
        let url = transport::join(&self.base_url, "/api/users");
        tracing::debug!(url = %url, "GET");
        let body = transport::get_json(&self.agent, &url).map_err(|e| match e {
            TransportError::Io(message) | TransportError::Body(message) => {
                DirectoryError::Unreachable {
                    url: url.clone(),
                    message,
                }
            }
            TransportError::Status { status, .. } => DirectoryError::Rejected {
                url: url.clone(),
                message: format!("HTTP {}", status),
            },
        })?;

        if body.get("status").and_then(Value::as_str) != Some("ok") {
            return Err(DirectoryError::Rejected {
                url,
                message: format!("unexpected response: {}", body),
            });
        }
        let users = body
            .get("data")
            .and_then(Value::as_array)
            .map(|records| {
                records
                    .iter()
                    .filter_map(|r| match serde_json::from_value::<DirectoryUser>(r.clone()) {
                        Ok(user) => Some(user),
                        Err(e) => {
                            tracing::debug!(error = %e, "skipping malformed PIK user record");
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(users)
    }
}

impl EventSink for PikClient {
    fn send(&self, event: &ProgressionEvent) -> Result<IngestReceipt, DeliveryFailure> {
        self.ingest(event)
    }
}

impl UserDirectory for PikClient {
    fn list_users(&self) -> Result<Vec<DirectoryUser>, DirectoryError> {
        PikClient::list_users(self)
    }
}
