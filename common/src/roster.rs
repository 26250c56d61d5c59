//! Plan a student roster import.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Outcome of importing a roster into one school.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

/// Split incoming names into those to create and those already present.
///
/// Names are trimmed and blank ones dropped. A name that already exists for the
/// school, or repeats earlier in the same batch, is skipped rather than rejected.
pub fn plan_import<'a, E, I>(existing: E, incoming: I) -> ImportSummary
where
    E: IntoIterator<Item = &'a str>,
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<&str> = existing.into_iter().map(str::trim).collect();
    let mut summary = ImportSummary::default();

    for name in incoming.into_iter().map(str::trim) {
        if name.is_empty() {
            continue;
        }
        if seen.insert(name) {
            summary.created.push(name.to_string());
        } else {
            summary.skipped.push(name.to_string());
        }
    }
    summary
}
