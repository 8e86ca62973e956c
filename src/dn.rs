//! Distinguished names of directory entries.
//!
//! Values are interpolated as-is. No DN escaping is applied.

use crate::config::Backend;

const GROUPS_OU: &str = "ou=groups";

/// Renders user and group DNs from the configured naming attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnBuilder {
    name_format: String,
    group_format: String,
    base_dn: String,
}

impl DnBuilder {
    /// Create a new [`DnBuilder`].
    pub fn new(
        name_format: impl Into<String>,
        group_format: impl Into<String>,
        base_dn: impl Into<String>,
    ) -> Self {
        Self {
            name_format: name_format.into(),
            group_format: group_format.into(),
            base_dn: base_dn.into(),
        }
    }

    /// `<name>=<user>,<group>=<primary group>,[<hierarchy>,]<base>`
    pub fn user(&self, username: &str, primary_group: &str, hierarchy: Option<&str>) -> String {
        match hierarchy.filter(|h| !h.is_empty()) {
            Some(hierarchy) => format!(
                "{}={},{}={},{},{}",
                self.name_format, username, self.group_format, primary_group, hierarchy, self.base_dn
            ),
            None => format!(
                "{}={},{}={},{}",
                self.name_format, username, self.group_format, primary_group, self.base_dn
            ),
        }
    }

    /// `<group>=<name>,ou=groups,<base>`
    pub fn group(&self, name: &str) -> String {
        format!("{}={},{},{}", self.group_format, name, GROUPS_OU, self.base_dn)
    }
}

impl From<&Backend> for DnBuilder {
    fn from(backend: &Backend) -> Self {
        Self::new(&backend.name_format, &backend.group_format, &backend.base_dn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> DnBuilder {
        DnBuilder::new("cn", "ou", "dc=example,dc=com")
    }

    #[test]
    fn test_user_dn() {
        assert_eq!(builder().user("alice", "staff", None), "cn=alice,ou=staff,dc=example,dc=com");
        assert_eq!(
            builder().user("alice", "staff", Some("")),
            "cn=alice,ou=staff,dc=example,dc=com"
        );
        assert_eq!(
            builder().user("alice", "staff", Some("ou=users")),
            "cn=alice,ou=staff,ou=users,dc=example,dc=com"
        );
    }

    #[test]
    fn test_group_dn() {
        assert_eq!(builder().group("wheel"), "ou=wheel,ou=groups,dc=example,dc=com");
        let dn = DnBuilder::new("uid", "cn", "dc=x").group("staff");
        assert_eq!(dn, "cn=staff,ou=groups,dc=x");
    }

    #[test]
    fn test_no_escaping() {
        assert_eq!(
            builder().user("a,b=c", "st+aff", None),
            "cn=a,b=c,ou=st+aff,dc=example,dc=com"
        );
    }

    #[test]
    fn test_from_backend() {
        let backend = Backend {
            base_dn: "dc=example,dc=net".into(),
            ..Default::default()
        };
        assert_eq!(
            DnBuilder::from(&backend).user("bob", "users", None),
            "cn=bob,ou=users,dc=example,dc=net"
        );
    }
}
