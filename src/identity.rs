//! Local Unix identity databases.

mod files;
pub mod reader;

pub use files::FlatFiles;

use crate::error::Result;

/// A passwd entry resolved by name or id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityRecord {
    pub username: String,
    pub uid: u32,
    pub gid: u32,
    /// Full name, the first sub-field of GECOS.
    pub name: String,
    pub home_dir: String,
}

impl IdentityRecord {
    /// Parse a `name:password:uid:gid:gecos:home:shell` line.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(7, ':');
        let username = parts.next()?;
        let _password = parts.next()?;
        let uid = parts.next()?.parse().ok()?;
        let gid = parts.next()?.parse().ok()?;
        let gecos = parts.next()?;
        let home_dir = parts.next()?;

        Some(Self {
            username: username.to_owned(),
            uid,
            gid,
            name: gecos.split(',').next().unwrap_or_default().to_owned(),
            home_dir: home_dir.to_owned(),
        })
    }

    /// Full name, or the user name when none is recorded.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.username
        } else {
            &self.name
        }
    }
}

/// Raw group line: gid as written plus its member names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupRecord {
    pub gid: String,
    pub member_names: Vec<String>,
}

/// A group entry resolved by name or id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnixGroup {
    pub name: String,
    pub gid: u32,
    pub members: Vec<String>,
}

impl UnixGroup {
    /// Parse a `name:password:gid:members` line.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(4, ':');
        let name = parts.next()?;
        let _password = parts.next()?;
        let gid = parts.next()?.parse().ok()?;
        let members = parts.next()?;

        Some(Self {
            name: name.to_owned(),
            gid,
            members: reader::split_members(members),
        })
    }
}

/// Port onto the operating system account database.
///
/// Lookups return `Ok(None)` for an unknown name or id and `Err` only when
/// the database itself cannot be read.
pub trait IdentitySource: Send + Sync {
    /// User id of every passwd line, in file order.
    fn list_user_ids(&self) -> Result<Vec<String>>;

    /// Every group line, in file order.
    fn list_groups(&self) -> Result<Vec<GroupRecord>>;

    fn user_by_name(&self, username: &str) -> Result<Option<IdentityRecord>>;

    fn user_by_id(&self, uid: &str) -> Result<Option<IdentityRecord>>;

    fn group_by_name(&self, name: &str) -> Result<Option<UnixGroup>>;

    fn group_by_id(&self, gid: &str) -> Result<Option<UnixGroup>>;

    /// Primary gid first, then every group listing the user as a member.
    fn group_ids(&self, user: &IdentityRecord) -> Result<Vec<u32>>;
}
