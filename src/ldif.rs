//! Text rendering of directory entries in LDIF layout.
//!
//! Values are written verbatim. Attributes follow in name order, so output
//! is stable across runs.

use std::fmt::Write;

use ldap3::SearchEntry;

/// Render one entry as an LDIF record terminated by a blank line.
pub fn render(entry: &SearchEntry) -> String {
    let mut out = format!("dn: {}\n", entry.dn);

    let mut names: Vec<_> = entry.attrs.keys().collect();
    names.sort();
    for name in names {
        for value in &entry.attrs[name] {
            let _ = writeln!(out, "{name}: {value}");
        }
    }

    out.push('\n');
    out
}

/// Render a sequence of entries.
pub fn render_all<'a>(entries: impl IntoIterator<Item = &'a SearchEntry>) -> String {
    entries.into_iter().map(render).collect()
}
