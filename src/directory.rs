//! Directory objects handed to the operations helper.

use std::sync::Arc;

use crate::auth::Authenticator;
use crate::capability::Capability;
use crate::error::{AuthError, BackendError};

/// Outcome of a single lookup.
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Failed(BackendError),
}

impl<T> Lookup<T> {
    /// The entity, when found.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }
}

/// A local account, materialized for one request.
#[derive(Debug, Clone)]
pub struct DirectoryUser {
    pub name: String,
    pub given_name: String,
    /// Unix id, also published as `uidNumber`.
    pub uid_number: u32,
    pub primary_group: u32,
    pub other_groups: Vec<u32>,
    pub homedir: String,
    pub disabled: bool,
    pub capabilities: Vec<Capability>,
    pub(crate) pass_app_custom: Arc<dyn Authenticator>,
}

impl DirectoryUser {
    /// Same value as `uid_number`.
    pub fn unix_id(&self) -> u32 {
        self.uid_number
    }

    /// Check `password` for this account with the host stack.
    pub fn authenticate(&self, password: &str) -> Result<(), AuthError> {
        self.pass_app_custom.authenticate(&self.name, password)
    }
}

/// A local group, materialized for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryGroup {
    pub name: String,
    /// Unix id, also published as `gidNumber`.
    pub gid_number: u32,
}

impl DirectoryGroup {
    /// Same value as `gid_number`.
    pub fn unix_id(&self) -> u32 {
        self.gid_number
    }
}
