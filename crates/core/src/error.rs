use hvlink_storage::StorageError;

/// Failure to obtain the session listing from HV.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// Transport failure: connection refused, DNS, timeout.
    #[error("HV unreachable ({url}): {message}")]
    Unreachable { url: String, message: String },

    /// HV answered with a non-success HTTP status.
    #[error("HV returned HTTP {status} ({url})")]
    Status { url: String, status: u16 },

    /// The body was not the expected `{status, data}` envelope.
    #[error("malformed HV response ({url}): {message}")]
    Malformed { url: String, message: String },
}

/// Failure to list accounts from the PIK user directory.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    #[error("PIK directory unreachable ({url}): {message}")]
    Unreachable { url: String, message: String },

    #[error("PIK directory rejected the request ({url}): {message}")]
    Rejected { url: String, message: String },
}

/// A single ingest call that did not produce a structured success.
///
/// `status` is the HTTP status when the server answered at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("ingest failed ({url}): {message}")]
pub struct DeliveryFailure {
    pub url: String,
    pub status: Option<u16>,
    pub message: String,
}

/// Errors that abort a poll pass.
///
/// A source outage is not one of them: it is reported on the
/// [`PassReport`](crate::PassReport) and the pass ends as a no-op.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("ledger error: {0}")]
    Ledger(#[from] StorageError),
}
