//! Connector configuration, built once at startup and passed by reference.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_HV_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_PIK_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_PIK_API_KEY: &str = "hv-demo-api-key-2025";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LEDGER_PATH: &str = "db/hv_connector_sent.db";

/// How the connector runs. The three modes are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Poll forever on the configured interval.
    Continuous,
    /// One pass, then exit.
    Once,
    /// One pass that logs projected outcomes; no ingest calls, no ledger writes.
    DryRun,
}

impl RunMode {
    pub fn is_dry_run(self) -> bool {
        self == RunMode::DryRun
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Continuous => f.write_str("continuous"),
            RunMode::Once => f.write_str("single pass"),
            RunMode::DryRun => f.write_str("dry-run"),
        }
    }
}

/// Which identity-linking rule to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentityStrategy {
    /// Fixed demo allow-list, gated on a reachable directory.
    #[default]
    AllowList,
    /// Match the player id against directory `auth_handle`s.
    Handle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorConfig {
    pub hv_api_url: String,
    pub pik_api_url: String,
    pub pik_api_key: String,
    pub poll_interval: Duration,
    /// Bound on every HTTP call; a timeout is a transport failure.
    pub request_timeout: Duration,
    pub ledger_path: PathBuf,
    pub identity: IdentityStrategy,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        ConnectorConfig {
            hv_api_url: DEFAULT_HV_API_URL.to_string(),
            pik_api_url: DEFAULT_PIK_API_URL.to_string(),
            pik_api_key: DEFAULT_PIK_API_KEY.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            identity: IdentityStrategy::AllowList,
        }
    }
}

impl ConnectorConfig {
    /// Trim trailing slashes so endpoint paths can be appended directly.
    pub fn normalized(mut self) -> Self {
        self.hv_api_url = self.hv_api_url.trim_end_matches('/').to_string();
        self.pik_api_url = self.pik_api_url.trim_end_matches('/').to_string();
        self
    }
}
