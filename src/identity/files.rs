//! Identity resolution straight from `/etc/passwd` and `/etc/group`.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{BackendError, Result};
use crate::identity::{
    GroupRecord, IdentityRecord, IdentitySource, UnixGroup, reader,
};

/// Flat-file account database. Every call re-opens and re-reads the files.
#[derive(Debug, Clone)]
pub struct FlatFiles {
    passwd: PathBuf,
    group: PathBuf,
}

impl FlatFiles {
    /// Create a new [`FlatFiles`].
    pub fn new(passwd: impl Into<PathBuf>, group: impl Into<PathBuf>) -> Self {
        Self {
            passwd: passwd.into(),
            group: group.into(),
        }
    }

    fn open(path: &Path) -> Result<BufReader<File>> {
        File::open(path)
            .map(BufReader::new)
            .map_err(|err| BackendError::io(path, err))
    }

    /// Lines that name resolution considers: no comments, no NSS compat
    /// entries.
    fn entries(path: &Path) -> Result<impl Iterator<Item = String>> {
        let file = Self::open(path)?;
        Ok(reader::lines(file).filter(|line| {
            !(line.is_empty() || line.starts_with(['#', '+', '-']))
        }))
    }

    fn find_user(
        &self,
        matches: impl Fn(&IdentityRecord) -> bool,
    ) -> Result<Option<IdentityRecord>> {
        Ok(Self::entries(&self.passwd)?
            .filter_map(|line| IdentityRecord::parse_line(&line))
            .find(|user| matches(user)))
    }

    fn find_group(
        &self,
        matches: impl Fn(&UnixGroup) -> bool,
    ) -> Result<Option<UnixGroup>> {
        Ok(Self::entries(&self.group)?
            .filter_map(|line| UnixGroup::parse_line(&line))
            .find(|group| matches(group)))
    }
}

impl IdentitySource for FlatFiles {
    fn list_user_ids(&self) -> Result<Vec<String>> {
        let file = Self::open(&self.passwd)?;
        Ok(reader::read_user_ids(file, &self.passwd))
    }

    fn list_groups(&self) -> Result<Vec<GroupRecord>> {
        let file = Self::open(&self.group)?;
        Ok(reader::read_groups(file, &self.group))
    }

    fn user_by_name(&self, username: &str) -> Result<Option<IdentityRecord>> {
        self.find_user(|user| user.username == username)
    }

    fn user_by_id(&self, uid: &str) -> Result<Option<IdentityRecord>> {
        let Ok(uid) = uid.parse::<u32>() else {
            return Ok(None);
        };
        self.find_user(|user| user.uid == uid)
    }

    fn group_by_name(&self, name: &str) -> Result<Option<UnixGroup>> {
        self.find_group(|group| group.name == name)
    }

    fn group_by_id(&self, gid: &str) -> Result<Option<UnixGroup>> {
        let Ok(gid) = gid.parse::<u32>() else {
            return Ok(None);
        };
        self.find_group(|group| group.gid == gid)
    }

    fn group_ids(&self, user: &IdentityRecord) -> Result<Vec<u32>> {
        let mut groups = vec![user.gid];
        for group in Self::entries(&self.group)?
            .filter_map(|line| UnixGroup::parse_line(&line))
        {
            if group.members.iter().any(|m| *m == user.username)
                && !groups.contains(&group.gid)
            {
                groups.push(group.gid);
            }
        }
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PASSWD: &str = "\
# local accounts
root:x:0:0:root:/root:/bin/bash
alice:x:1000:100:Alice Liddell,,,:/home/alice:/bin/bash
+nisuser::::::
bob:x:1001:1001::/home/bob:/bin/sh
bad:x:notanumber:100::/:/bin/false
";

    const GROUP: &str = "\
root:x:0:
wheel:x:10:bob
staff:x:100:alice,bob
bob:x:1001:
";

    fn write(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_lookups() {
        let passwd = write(PASSWD);
        let group = write(GROUP);
        let files = FlatFiles::new(passwd.path(), group.path());

        let alice = files.user_by_name("alice").unwrap().unwrap();
        assert_eq!(alice.uid, 1000);
        assert_eq!(alice.name, "Alice Liddell");
        assert_eq!(files.user_by_id("1001").unwrap().unwrap().username, "bob");
        assert!(files.user_by_name("nobody").unwrap().is_none());
        assert!(files.user_by_name("bad").unwrap().is_none());
        assert!(files.user_by_id("x").unwrap().is_none());

        assert_eq!(files.group_by_id("100").unwrap().unwrap().name, "staff");
        assert_eq!(files.group_by_name("wheel").unwrap().unwrap().gid, 10);
        assert!(files.group_by_name("audio").unwrap().is_none());
    }

    #[test]
    fn test_lookups_past_non_utf8_line() {
        let mut passwd = NamedTempFile::new().unwrap();
        passwd
            .write_all(
                b"root:x:0:0:root:/root:/bin/bash\n\
                  jose:x:1000:100:Jos\xE9 Garc\xEDa:/home/jose:/bin/sh\n\
                  alice:x:1001:100:Alice:/home/alice:/bin/sh\n",
            )
            .unwrap();
        let mut group = NamedTempFile::new().unwrap();
        group
            .write_all(b"caf\xE9:x:50:alice\nstaff:x:100:alice\n")
            .unwrap();
        let files = FlatFiles::new(passwd.path(), group.path());

        let alice = files.user_by_name("alice").unwrap().unwrap();
        assert_eq!(alice.uid, 1001);
        assert_eq!(files.user_by_id("1001").unwrap().unwrap().username, "alice");
        assert_eq!(files.group_by_id("100").unwrap().unwrap().name, "staff");
        assert_eq!(files.group_ids(&alice).unwrap(), vec![100, 50]);

        let jose = files.user_by_id("1000").unwrap().unwrap();
        assert_eq!(jose.username, "jose");
        assert_eq!(jose.name, "Jos\u{FFFD} Garc\u{FFFD}a");
    }

    #[test]
    fn test_group_ids() {
        let passwd = write(PASSWD);
        let group = write(GROUP);
        let files = FlatFiles::new(passwd.path(), group.path());

        let bob = files.user_by_name("bob").unwrap().unwrap();
        assert_eq!(files.group_ids(&bob).unwrap(), vec![1001, 10, 100]);

        let root = files.user_by_name("root").unwrap().unwrap();
        assert_eq!(files.group_ids(&root).unwrap(), vec![0]);
    }

    #[test]
    fn test_listing_keeps_file_order() {
        let passwd = write(PASSWD);
        let group = write(GROUP);
        let files = FlatFiles::new(passwd.path(), group.path());

        // The comment line has a single field and is skipped by the reader.
        assert_eq!(files.list_user_ids().unwrap(), vec![
            "0", "1000", "", "1001", "notanumber"
        ]);
        let gids: Vec<_> = files
            .list_groups()
            .unwrap()
            .into_iter()
            .map(|g| g.gid)
            .collect();
        assert_eq!(gids, vec!["0", "10", "100", "1001"]);
    }

    #[test]
    fn test_missing_source() {
        let files = FlatFiles::new("/nonexistent/passwd", "/nonexistent/group");
        assert!(matches!(files.list_user_ids(), Err(BackendError::Io { .. })));
        assert!(matches!(files.list_groups(), Err(BackendError::Io { .. })));
        assert!(files.user_by_name("root").is_err());
    }
}
