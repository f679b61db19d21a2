use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where a report came from. `url` identifies the source when merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub name: String,
    pub url: String,
    #[serde(default, alias = "fetchedAt")]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl SourceRef {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            fetched_at: None,
        }
    }
}

/// Union of source lists, de-duplicated by url in first-seen order.
pub fn merge_sources<'a, I>(lists: I) -> Vec<SourceRef>
where
    I: IntoIterator<Item = &'a [SourceRef]>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged = Vec::new();
    for list in lists {
        for source in list {
            if seen.insert(source.url.as_str()) {
                merged.push(source.clone());
            }
        }
    }
    merged
}
