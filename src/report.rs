//! JSON output of collected issues.
//!
//! The report is a pretty-printed JSON array of issues written with a single
//! trailing newline. Issue order is the collection's insertion order.

use std::io::Write;

use crate::reporter::IssueCollection;

/// Render the issues as a pretty-printed JSON array.
pub fn to_json(issues: &IssueCollection) -> serde_json::Result<String> {
    serde_json::to_string_pretty(issues)
}

/// Write the issues to `out` as one JSON document.
pub fn write_json<W: Write + ?Sized>(out: &mut W, issues: &IssueCollection) -> anyhow::Result<()> {
    let json = to_json(issues)?;
    writeln!(out, "{}", json)?;
    Ok(())
}
