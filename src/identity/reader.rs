//! Best-effort readers for passwd- and group-style databases.
//!
//! Both readers stop at end of stream or at the first read error and return
//! what was parsed so far. Lines with fewer than three fields are logged and
//! skipped.

use std::io::BufRead;
use std::path::Path;

use crate::identity::GroupRecord;

const FIELD_DELIMITER: char = ':';
const MEMBER_DELIMITER: char = ',';
const MIN_FIELDS: usize = 3;

/// Split a database line on `:`, keeping empty fields.
pub fn split_fields(line: &str) -> Vec<&str> {
    line.split(FIELD_DELIMITER).collect()
}

/// Split a member list on `,`, dropping empty and repeated names.
pub fn split_members(field: &str) -> Vec<String> {
    let mut members: Vec<String> = Vec::new();
    for name in field.split(MEMBER_DELIMITER).filter(|n| !n.is_empty()) {
        if !members.iter().any(|m| m == name) {
            members.push(name.to_owned());
        }
    }
    members
}

/// Iterate over the lines of `reader` until end of stream or a read error.
///
/// Bytes that are not valid UTF-8 are replaced, never fatal.
pub(crate) fn lines(reader: impl BufRead) -> impl Iterator<Item = String> {
    reader
        .split(b'\n')
        .map_while(|line| line.ok())
        .map(|mut line| {
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            String::from_utf8_lossy(&line).into_owned()
        })
}

/// Collect the user id (third field) of every passwd line.
pub fn read_user_ids(reader: impl BufRead, origin: &Path) -> Vec<String> {
    let mut entries = Vec::new();
    for line in lines(reader) {
        let fields = split_fields(&line);
        // expect username:*:uid:gid
        if fields.len() < MIN_FIELDS {
            tracing::info!(path = ?origin, %line, "unexpected number of fields");
            continue;
        }
        entries.push(fields[2].to_owned());
    }
    entries
}

/// Collect the gid and member list of every group line.
pub fn read_groups(reader: impl BufRead, origin: &Path) -> Vec<GroupRecord> {
    let mut entries = Vec::new();
    for line in lines(reader) {
        let fields = split_fields(&line);
        // expect group:*:gid
        if fields.len() < MIN_FIELDS {
            tracing::info!(path = ?origin, %line, "unexpected number of fields");
            continue;
        }
        let members = fields.last().map(|f| split_members(f)).unwrap_or_default();
        entries.push(GroupRecord {
            gid: fields[2].to_owned(),
            member_names: members,
        });
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    #[test]
    fn test_split_fields_keeps_empty() {
        assert_eq!(split_fields("alice:x:1000:100::"), vec![
            "alice", "x", "1000", "100", "", ""
        ]);
        assert_eq!(split_fields("a::"), vec!["a", "", ""]);
    }

    #[test]
    fn test_split_members_drops_empty() {
        assert_eq!(split_members("alice,,bob,"), vec!["alice", "bob"]);
        assert_eq!(split_members(",alice,alice"), vec!["alice"]);
        assert!(split_members("").is_empty());
    }

    #[test]
    fn test_read_user_ids_skips_malformed() {
        let content = "root:x:0:0:root:/root:/bin/bash\n\
                       garbage\n\
                       \n\
                       alice:x:1000:100:Alice:/home/alice:/bin/sh\n\
                       bob:x\n\
                       carol:x:1002\n";
        let ids = read_user_ids(Cursor::new(content), Path::new("passwd"));
        assert_eq!(ids, vec!["0", "1000", "1002"]);
    }

    #[test]
    fn test_read_groups() {
        let content = "wheel:x:10:\n\
                       staff:x:100:alice,,bob,\r\n\
                       broken:x\n\
                       users:x:1000:carol\n";
        let groups = read_groups(Cursor::new(content), Path::new("group"));

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].gid, "10");
        assert!(groups[0].member_names.is_empty());
        assert_eq!(groups[1].gid, "100");
        assert_eq!(groups[1].member_names, vec!["alice", "bob"]);
        assert_eq!(groups[2].member_names, vec!["carol"]);
    }

    struct FailAfter {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailAfter {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(std::io::Error::other("device gone")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_read_error_keeps_parsed_lines() {
        let reader = BufReader::new(FailAfter {
            data: Cursor::new(b"a:x:1:1\nb:x:2:2\n".to_vec()),
        });
        let ids = read_user_ids(reader, Path::new("passwd"));
        assert_eq!(ids, vec!["1", "2"]);
    }
}
