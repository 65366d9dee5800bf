//! Linking HV players to PIK accounts.
//!
//! Two levels:
//! - [`UserDirectory`] lists PIK accounts (one HTTP call per pass)
//! - [`IdentityResolver`] answers "which root_id is this player?"
//!
//! Resolvers take a directory snapshot in [`IdentityResolver::refresh`] at
//! the start of each pass. If the directory cannot be read, every lookup in
//! that pass is [`Resolution::Unresolved`]; the next pass tries again.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DirectoryError;

/// Outcome of linking one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(String),
    Unresolved,
}

impl Resolution {
    pub fn root_id(&self) -> Option<&str> {
        match self {
            Resolution::Resolved(id) => Some(id),
            Resolution::Unresolved => None,
        }
    }
}

/// An account entry from the PIK user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    #[serde(default)]
    pub root_id: String,
    #[serde(default)]
    pub auth_handle: Option<String>,
}

pub trait UserDirectory {
    fn list_users(&self) -> Result<Vec<DirectoryUser>, DirectoryError>;
}

impl<D: UserDirectory + ?Sized> UserDirectory for &D {
    fn list_users(&self) -> Result<Vec<DirectoryUser>, DirectoryError> {
        (**self).list_users()
    }
}

/// Maps an HV player identifier to a PIK root_id.
pub trait IdentityResolver {
    /// Re-read whatever backing data the resolver needs. Called once per
    /// pass, before any `resolve`.
    fn refresh(&mut self) {}

    fn resolve(&self, player_id: &str) -> Resolution;
}

impl<R: IdentityResolver + ?Sized> IdentityResolver for Box<R> {
    fn refresh(&mut self) {
        (**self).refresh()
    }

    fn resolve(&self, player_id: &str) -> Resolution {
        (**self).resolve(player_id)
    }
}

// ──────────────────────────────────────────────
// AllowList
// ──────────────────────────────────────────────

/// Fixed player → root_id table.
///
/// Placeholder linking: real sessions should carry a verified identity
/// assertion instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    links: BTreeMap<String, String>,
}

impl AllowList {
    pub fn new() -> Self {
        Self::default()
    }

    /// The demo partition: players 001/002 → operator root, 003/004 → self root.
    pub fn demo() -> Self {
        let mut list = Self::new();
        for player in ["demo-player-001", "demo-player-002"] {
            list.link(player, "pik-root-demo-operator-001");
        }
        for player in ["demo-player-003", "demo-player-004"] {
            list.link(player, "pik-root-demo-self-001");
        }
        list
    }

    pub fn link(&mut self, player_id: &str, root_id: &str) -> &mut Self {
        self.links
            .insert(player_id.to_string(), root_id.to_string());
        self
    }

    pub fn get(&self, player_id: &str) -> Option<&str> {
        self.links.get(player_id).map(|s| s.as_str())
    }
}

/// Allow-list resolution gated on a reachable, non-empty directory.
pub struct AllowListResolver<D> {
    directory: D,
    allow_list: AllowList,
    directory_ready: bool,
}

impl<D: UserDirectory> AllowListResolver<D> {
    pub fn new(directory: D, allow_list: AllowList) -> Self {
        AllowListResolver {
            directory,
            allow_list,
            directory_ready: false,
        }
    }
}

impl<D: UserDirectory> IdentityResolver for AllowListResolver<D> {
    fn refresh(&mut self) {
        self.directory_ready = match self.directory.list_users() {
            Ok(users) => {
                tracing::debug!(users = users.len(), "PIK directory loaded");
                !users.is_empty()
            }
            Err(e) => {
                tracing::warn!(error = %e, "PIK directory unavailable, players stay unresolved");
                false
            }
        };
    }

    fn resolve(&self, player_id: &str) -> Resolution {
        if !self.directory_ready {
            return Resolution::Unresolved;
        }
        match self.allow_list.get(player_id) {
            Some(root_id) => Resolution::Resolved(root_id.to_string()),
            None => Resolution::Unresolved,
        }
    }
}

/// Resolves a player to the account whose `auth_handle` equals the player id.
pub struct HandleResolver<D> {
    directory: D,
    handles: BTreeMap<String, String>,
}

impl<D: UserDirectory> HandleResolver<D> {
    pub fn new(directory: D) -> Self {
        HandleResolver {
            directory,
            handles: BTreeMap::new(),
        }
    }
}

impl<D: UserDirectory> IdentityResolver for HandleResolver<D> {
    fn refresh(&mut self) {
        self.handles.clear();
        match self.directory.list_users() {
            Ok(users) => {
                for user in users {
                    if let Some(handle) = user.auth_handle.filter(|h| !h.is_empty()) {
                        if !user.root_id.is_empty() {
                            self.handles.entry(handle).or_insert(user.root_id);
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "PIK directory unavailable, players stay unresolved")
            }
        }
    }

    fn resolve(&self, player_id: &str) -> Resolution {
        match self.handles.get(player_id) {
            Some(root_id) => Resolution::Resolved(root_id.clone()),
            None => Resolution::Unresolved,
        }
    }
}
