//! unixdir publishes the local Unix account database as an LDAP directory.
//!
//! Users and groups come from `/etc/passwd` and `/etc/group`, passwords are
//! checked by the host authentication stack. The directory is read-only.

#![forbid(unsafe_code)]

pub mod auth;
pub mod capability;
pub mod config;
pub mod directory;
pub mod dn;
pub mod error;
pub mod handler;
pub mod identity;
pub mod ldif;

pub use directory::{DirectoryGroup, DirectoryUser, Lookup};
pub use error::{AuthError, BackendError, Result};
pub use handler::{Handler, OpsHelper, ResultCode, UnixHandler};
