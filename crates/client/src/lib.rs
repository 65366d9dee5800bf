//! HTTP implementations of the connector seams.
//!
//! Uses `ureq` (sync) agents with a global timeout: the poll loop is
//! single-threaded and blocking, so there is no async runtime here.
//!
//! - [`HvClient`]: HV session listing ([`SessionSource`](hvlink_core::SessionSource))
//! - [`PikClient`]: PIK ingest ([`EventSink`](hvlink_core::EventSink)) and
//!   user directory ([`UserDirectory`](hvlink_core::UserDirectory))

mod hv;
mod pik;
mod transport;

pub use hv::HvClient;
pub use pik::PikClient;
