//! hvlink core -- turns completed HV play sessions into PIK progression
//! events and forwards each session at most once.
//!
//! Data flow for one pass:
//! [`SessionSource`] → filter through the [`Ledger`](hvlink_storage::Ledger)
//! → [`translate`] per session (identity via an [`IdentityResolver`])
//! → [`EventSink`] per event → ledger commit per session.
//!
//! The HTTP implementations of the source, sink and user directory live in
//! `hvlink-client`; this crate only defines the seams and the rules.

pub mod config;
pub mod delivery;
pub mod error;
pub mod event;
pub mod identity;
pub mod poll;
pub mod session;
pub mod translate;

pub use config::{ConnectorConfig, IdentityStrategy, RunMode};
pub use delivery::{EventSink, IngestReceipt, LevelUp};
pub use error::{DeliveryFailure, DirectoryError, PollError, SourceError};
pub use event::{EventPayload, EventType, ProgressionEvent, TitleTier};
pub use identity::{
    AllowList, AllowListResolver, DirectoryUser, HandleResolver, IdentityResolver, Resolution,
    UserDirectory,
};
pub use poll::{Connector, PassReport, Projection};
pub use session::{EconomySummary, NodeState, PlayerRef, Session, SessionSource, SessionState};
pub use translate::{translate, PlayerEvents, SessionSummary, Translation};
