//! Handler serving the local Unix account database.

use std::collections::HashMap;
use std::sync::Arc;

use ldap3::SearchEntry;

use crate::auth::Authenticator;
use crate::capability::SearchCapability;
use crate::config::Backend;
use crate::directory::{DirectoryGroup, DirectoryUser, Lookup};
use crate::dn::DnBuilder;
use crate::error::Result;
use crate::handler::{
    AddRequest, Handler, ModifyRequest, OpsHelper, ResultCode, SearchRequest,
    SearchResult,
};
use crate::identity::{
    FlatFiles, GroupRecord, IdentityRecord, IdentitySource, UnixGroup,
};

/// Directory view of `/etc/passwd`, `/etc/group` and PAM.
///
/// Holds no per-request state: every operation re-reads the identity source.
pub struct UnixHandler {
    backend: Backend,
    source: Arc<dyn IdentitySource>,
    authenticator: Arc<dyn Authenticator>,
    helper: Option<Arc<dyn OpsHelper>>,
    dn: DnBuilder,
    search_capability: SearchCapability,
}

impl UnixHandler {
    /// Create a new [`UnixHandler`] reading the files named in `backend`.
    pub fn new(backend: Backend, authenticator: Arc<dyn Authenticator>) -> Self {
        let source = Arc::new(FlatFiles::new(&backend.passwd, &backend.group));
        Self::with_source(backend, source, authenticator)
    }

    /// Create a new [`UnixHandler`] over any identity source.
    pub fn with_source(
        backend: Backend,
        source: Arc<dyn IdentitySource>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        let search_capability = SearchCapability::resolve(
            source.as_ref(),
            backend.group_with_search_capability.as_deref(),
        );

        Self {
            dn: DnBuilder::from(&backend),
            backend,
            source,
            authenticator,
            helper: None,
            search_capability,
        }
    }

    /// Update operations helper used for bind and search.
    pub fn with_helper(mut self, helper: Arc<dyn OpsHelper>) -> Self {
        self.helper = Some(helper);
        self
    }

    pub fn search_capability(&self) -> SearchCapability {
        self.search_capability
    }

    /// DNs of every group `user` belongs to.
    fn member_of(&self, user: &IdentityRecord) -> Vec<String> {
        let Ok(gids) = self.source.group_ids(user) else {
            return Vec::new();
        };

        gids.iter()
            .filter_map(|gid| match self.source.group_by_id(&gid.to_string()) {
                Ok(Some(group)) => Some(self.dn.group(&group.name)),
                Ok(None) => {
                    tracing::debug!(gid, "bad group");
                    None
                },
                Err(err) => {
                    tracing::debug!(gid, error = %err, "bad group");
                    None
                },
            })
            .collect()
    }

    /// Member DNs and member names of `group`, dropping unresolvable users.
    fn members(&self, group: &GroupRecord) -> (Vec<String>, Vec<String>) {
        let mut dns = Vec::new();
        let mut uids = Vec::new();

        for name in &group.member_names {
            let user = match self.source.user_by_name(name) {
                Ok(Some(user)) => user,
                Ok(None) => {
                    tracing::debug!(%name, group = %group.gid, "bad user");
                    continue;
                },
                Err(err) => {
                    tracing::debug!(%name, group = %group.gid, error = %err, "bad user");
                    continue;
                },
            };
            let Ok(Some(primary)) = self.source.group_by_id(&user.gid.to_string()) else {
                tracing::debug!(%name, gid = user.gid, "user without primary group");
                continue;
            };

            dns.push(self.dn.user(&user.username, &primary.name, None));
            uids.push(user.username);
        }

        (dns, uids)
    }

    fn account_entry(
        &self,
        user: &IdentityRecord,
        primary: &UnixGroup,
        hierarchy: &str,
    ) -> SearchEntry {
        let mut attrs = vec![
            ("cn", vec![user.username.clone()]),
            ("uid", vec![user.username.clone()]),
            ("ou", vec![primary.name.clone()]),
            ("uidNumber", vec![user.uid.to_string()]),
            ("accountStatus", vec!["active".to_owned()]),
            ("objectClass", vec!["posixAccount".to_owned()]),
            ("description", vec![user.username.clone()]),
            ("gecos", vec![user.username.clone()]),
            ("gidNumber", vec![user.gid.to_string()]),
            ("givenName", vec![user.display_name().to_owned()]),
            ("displayName", vec![user.display_name().to_owned()]),
        ];

        if !user.home_dir.is_empty() {
            attrs.push(("homeDirectory", vec![user.home_dir.clone()]));
        }

        let member_of = self.member_of(user);
        if !member_of.is_empty() {
            attrs.push(("memberOf", member_of));
        }

        entry(
            self.dn.user(&user.username, &primary.name, Some(hierarchy)),
            attrs,
        )
    }

    fn group_entry(&self, group: &UnixGroup, record: &GroupRecord) -> SearchEntry {
        let (member_dns, member_uids) = self.members(record);

        entry(self.dn.group(&group.name), vec![
            ("cn", vec![group.name.clone()]),
            ("uid", vec![group.name.clone()]),
            ("description", vec![group.name.clone()]),
            ("gidNumber", vec![group.gid.to_string()]),
            ("objectClass", vec!["posixGroup".to_owned()]),
            ("uniqueMember", member_dns),
            ("memberUid", member_uids),
        ])
    }
}

fn entry(dn: String, attrs: Vec<(&str, Vec<String>)>) -> SearchEntry {
    SearchEntry {
        dn,
        attrs: attrs
            .into_iter()
            .map(|(name, values)| (name.to_owned(), values))
            .collect(),
        bin_attrs: HashMap::new(),
    }
}

impl Handler for UnixHandler {
    fn backend(&self) -> &Backend {
        &self.backend
    }

    fn bind(&self, bind_dn: &str, password: &str) -> Result<ResultCode> {
        match &self.helper {
            Some(helper) => helper.bind(self, bind_dn, password),
            None => {
                tracing::warn!(%bind_dn, "bind refused: no operations helper configured");
                Ok(ResultCode::UnwillingToPerform)
            },
        }
    }

    fn search(&self, bound_dn: &str, request: &SearchRequest) -> Result<SearchResult> {
        match &self.helper {
            Some(helper) => helper.search(self, bound_dn, request),
            None => {
                tracing::warn!(%bound_dn, "search refused: no operations helper configured");
                Ok(SearchResult::empty(ResultCode::UnwillingToPerform))
            },
        }
    }

    fn add(&self, _bound_dn: &str, _request: &AddRequest) -> Result<ResultCode> {
        Ok(ResultCode::InsufficientAccessRights)
    }

    fn modify(&self, _bound_dn: &str, _request: &ModifyRequest) -> Result<ResultCode> {
        Ok(ResultCode::InsufficientAccessRights)
    }

    fn delete(&self, _bound_dn: &str, _delete_dn: &str) -> Result<ResultCode> {
        Ok(ResultCode::InsufficientAccessRights)
    }

    fn close(&self, _bound_dn: &str) -> Result<()> {
        Ok(())
    }

    fn find_user(&self, username: &str, search_by_upn: bool) -> Lookup<DirectoryUser> {
        tracing::debug!(%username, search_by_upn, "find user");
        if search_by_upn {
            tracing::info!("searching by UPN is not supported");
            return Lookup::NotFound;
        }

        let user = match self.source.user_by_name(username) {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::info!(%username, "find user failed: no such user");
                return Lookup::NotFound;
            },
            Err(err) => {
                tracing::info!(%username, error = %err, "find user failed");
                return Lookup::Failed(err);
            },
        };

        let other_groups = match self.source.group_ids(&user) {
            Ok(groups) => groups,
            Err(err) => {
                tracing::info!(%username, error = %err, "find user: user without groups");
                Vec::new()
            },
        };

        Lookup::Found(DirectoryUser {
            given_name: user.display_name().to_owned(),
            capabilities: self.search_capability.grant(user.gid, &other_groups),
            name: user.username,
            uid_number: user.uid,
            primary_group: user.gid,
            other_groups,
            homedir: user.home_dir,
            disabled: false,
            pass_app_custom: Arc::clone(&self.authenticator),
        })
    }

    fn find_group(&self, name: &str) -> Lookup<DirectoryGroup> {
        let groups = match self.source.list_groups() {
            Ok(groups) => groups,
            Err(err) => {
                tracing::info!(error = %err, "find group: failed to enumerate groups");
                return Lookup::NotFound;
            },
        };

        for record in groups {
            match self.source.group_by_id(&record.gid) {
                Ok(Some(group)) if group.name == name => {
                    return Lookup::Found(DirectoryGroup {
                        name: group.name,
                        gid_number: group.gid,
                    });
                },
                Ok(Some(_)) => {},
                Ok(None) => tracing::debug!(gid = %record.gid, "find group: bad group"),
                Err(err) => {
                    tracing::debug!(gid = %record.gid, error = %err, "find group: bad group")
                },
            }
        }

        Lookup::NotFound
    }

    fn find_posix_accounts(&self, hierarchy: &str) -> Result<Vec<SearchEntry>> {
        let mut entries = Vec::new();

        for uid in self.source.list_user_ids()? {
            let user = match self.source.user_by_id(&uid) {
                Ok(Some(user)) => user,
                Ok(None) => {
                    tracing::debug!(%uid, "bad user");
                    continue;
                },
                Err(err) => {
                    tracing::debug!(%uid, error = %err, "bad user");
                    continue;
                },
            };
            let Ok(Some(primary)) = self.source.group_by_id(&user.gid.to_string()) else {
                tracing::debug!(user = %user.username, gid = user.gid, "bad primary group");
                continue;
            };

            entries.push(self.account_entry(&user, &primary, hierarchy));
        }

        Ok(entries)
    }

    fn find_posix_groups(&self, _hierarchy: &str) -> Result<Vec<SearchEntry>> {
        let mut entries = Vec::new();

        for record in self.source.list_groups()? {
            let group = match self.source.group_by_id(&record.gid) {
                Ok(Some(group)) => group,
                Ok(None) => {
                    tracing::debug!(gid = %record.gid, "bad group");
                    continue;
                },
                Err(err) => {
                    tracing::debug!(gid = %record.gid, error = %err, "bad group");
                    continue;
                },
            };

            entries.push(self.group_entry(&group, &record));
        }

        Ok(entries)
    }
}
