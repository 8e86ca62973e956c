//! Directory capabilities granted through group membership.

use serde::{Deserialize, Serialize};

use crate::identity::IdentitySource;

/// An authorization grant on directory objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    pub action: String,
    pub object: String,
}

impl Capability {
    /// Search on every object.
    pub fn search_all() -> Self {
        Self {
            action: "search".into(),
            object: "*".into(),
        }
    }
}

/// Group whose members may search the whole directory.
///
/// Resolved once, when the handler is built. An unknown group never grants
/// anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchCapability {
    gid: Option<u32>,
}

impl SearchCapability {
    /// Resolve `group_name` against `source`.
    pub fn resolve(source: &dyn IdentitySource, group_name: Option<&str>) -> Self {
        let Some(name) = group_name.filter(|n| !n.is_empty()) else {
            return Self::default();
        };

        match source.group_by_name(name) {
            Ok(Some(group)) => {
                tracing::debug!(group = name, gid = group.gid, "members will get search capability");
                Self {
                    gid: Some(group.gid),
                }
            },
            Ok(None) => {
                tracing::error!(group = name, "failed to resolve group with search capability: no such group");
                Self::default()
            },
            Err(err) => {
                tracing::error!(group = name, error = %err, "failed to resolve group with search capability");
                Self::default()
            },
        }
    }

    pub fn gid(&self) -> Option<u32> {
        self.gid
    }

    /// Capabilities of a user with the given primary and other groups.
    pub fn grant(&self, primary: u32, others: &[u32]) -> Vec<Capability> {
        match self.gid {
            Some(gid) if primary == gid || others.contains(&gid) => {
                vec![Capability::search_all()]
            },
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wheel() -> SearchCapability {
        SearchCapability { gid: Some(10) }
    }

    #[test]
    fn test_grant_primary() {
        let cap = wheel();
        assert_eq!(cap.grant(10, &[]), vec![Capability::search_all()]);
    }

    #[test]
    fn test_grant_supplementary() {
        let cap = wheel();
        assert_eq!(cap.grant(100, &[100, 27, 10]), vec![Capability::search_all()]);
        // Never more than one entry.
        assert_eq!(cap.grant(10, &[10, 10]).len(), 1);
    }

    #[test]
    fn test_no_grant() {
        assert!(wheel().grant(100, &[100, 27]).is_empty());
        assert!(SearchCapability::default().grant(0, &[0, 10]).is_empty());
    }

    #[test]
    fn test_search_all() {
        let cap = Capability::search_all();
        assert_eq!(cap.action, "search");
        assert_eq!(cap.object, "*");
    }
}
