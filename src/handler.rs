//! Directory handlers and the operations helper that drives them.
//!
//! The protocol front-end calls a [`Handler`]. Bind and search are delegated
//! to an [`OpsHelper`], which calls back into the handler's lookup
//! primitives to implement the LDAP algorithms.

mod unix;

pub use unix::UnixHandler;

use std::collections::HashSet;

use ldap3::{Mod, Scope, SearchEntry};

use crate::config::Backend;
use crate::directory::{DirectoryGroup, DirectoryUser, Lookup};
use crate::error::Result;

/// LDAP result codes returned by handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ResultCode {
    Success = 0,
    OperationsError = 1,
    NoSuchObject = 32,
    InvalidCredentials = 49,
    InsufficientAccessRights = 50,
    UnwillingToPerform = 53,
}

/// A decoded search operation.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub base_dn: String,
    pub scope: Scope,
    pub filter: String,
    pub attributes: Vec<String>,
    pub size_limit: i32,
}

/// Entries produced for a search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub entries: Vec<SearchEntry>,
    pub referrals: Vec<String>,
    pub result_code: ResultCode,
}

impl SearchResult {
    /// An empty result carrying only `code`.
    pub fn empty(code: ResultCode) -> Self {
        Self {
            entries: Vec::new(),
            referrals: Vec::new(),
            result_code: code,
        }
    }
}

/// A decoded add operation.
#[derive(Debug, Clone)]
pub struct AddRequest {
    pub dn: String,
    pub attributes: Vec<(String, HashSet<String>)>,
}

/// A decoded modify operation.
#[derive(Debug, Clone)]
pub struct ModifyRequest {
    pub dn: String,
    pub changes: Vec<Mod<String>>,
}

/// LDAP bind and search algorithms built on a handler's lookups.
pub trait OpsHelper: Send + Sync {
    fn bind(&self, handler: &dyn Handler, bind_dn: &str, password: &str) -> Result<ResultCode>;

    fn search(
        &self,
        handler: &dyn Handler,
        bound_dn: &str,
        request: &SearchRequest,
    ) -> Result<SearchResult>;
}

/// Capability set of a directory backend.
pub trait Handler: Send + Sync {
    /// Backend configuration, for the operations helper.
    fn backend(&self) -> &Backend;

    fn bind(&self, bind_dn: &str, password: &str) -> Result<ResultCode>;

    fn search(&self, bound_dn: &str, request: &SearchRequest) -> Result<SearchResult>;

    fn add(&self, bound_dn: &str, request: &AddRequest) -> Result<ResultCode>;

    fn modify(&self, bound_dn: &str, request: &ModifyRequest) -> Result<ResultCode>;

    fn delete(&self, bound_dn: &str, delete_dn: &str) -> Result<ResultCode>;

    /// Called when the connection of `bound_dn` goes away.
    fn close(&self, bound_dn: &str) -> Result<()>;

    fn find_user(&self, username: &str, search_by_upn: bool) -> Lookup<DirectoryUser>;

    fn find_group(&self, name: &str) -> Lookup<DirectoryGroup>;

    /// One `posixAccount` entry per resolvable local user.
    fn find_posix_accounts(&self, hierarchy: &str) -> Result<Vec<SearchEntry>>;

    /// One `posixGroup` entry per resolvable local group.
    fn find_posix_groups(&self, hierarchy: &str) -> Result<Vec<SearchEntry>>;
}
