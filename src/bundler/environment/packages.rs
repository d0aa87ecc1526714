//! Installed-package bookkeeping for the runtime environment.

use std::collections::BTreeSet;

/// Canonical package name: lowercase, with `_` and `.` folded into `-`.
pub fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '_' | '.' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Package names from `pip freeze` output, version suffixes stripped.
///
/// Handles `name==1.0`, `name @ file:///...` and `name>=1.0`; skips blank
/// lines, comments and editable (`-e`) entries.
pub fn parse_freeze<I, S>(lines: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| {
            let line = line.as_ref().trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
                return None;
            }
            let name = line
                .split(['=', '@', ' ', '<', '>', '~', '!', ';', '['])
                .next()
                .unwrap_or_default();
            if name.is_empty() {
                None
            } else {
                Some(normalize(name))
            }
        })
        .collect()
}

/// Required packages absent from `installed`, in their configured order.
pub fn missing(required: &[String], installed: &BTreeSet<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    required
        .iter()
        .filter(|name| {
            let canonical = normalize(name);
            !installed.contains(&canonical) && seen.insert(canonical)
        })
        .cloned()
        .collect()
}
