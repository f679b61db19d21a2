use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Maximum number of values kept per entity key.
pub const ENTITY_CAP: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Locations,
    Organizations,
    Groups,
    Topics,
    Keywords,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Locations,
        EntityKind::Organizations,
        EntityKind::Groups,
        EntityKind::Topics,
        EntityKind::Keywords,
    ];
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Locations => write!(f, "locations"),
            EntityKind::Organizations => write!(f, "organizations"),
            EntityKind::Groups => write!(f, "groups"),
            EntityKind::Topics => write!(f, "topics"),
            EntityKind::Keywords => write!(f, "keywords"),
        }
    }
}

/// Extracted entities, one ordered list per fixed key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityList {
    pub locations: Vec<String>,
    pub organizations: Vec<String>,
    pub groups: Vec<String>,
    pub topics: Vec<String>,
    pub keywords: Vec<String>,
}

impl EntityList {
    pub fn get(&self, kind: EntityKind) -> &[String] {
        match kind {
            EntityKind::Locations => &self.locations,
            EntityKind::Organizations => &self.organizations,
            EntityKind::Groups => &self.groups,
            EntityKind::Topics => &self.topics,
            EntityKind::Keywords => &self.keywords,
        }
    }

    fn get_mut(&mut self, kind: EntityKind) -> &mut Vec<String> {
        match kind {
            EntityKind::Locations => &mut self.locations,
            EntityKind::Organizations => &mut self.organizations,
            EntityKind::Groups => &mut self.groups,
            EntityKind::Topics => &mut self.topics,
            EntityKind::Keywords => &mut self.keywords,
        }
    }

    /// Total number of values across all keys.
    pub fn count(&self) -> usize {
        EntityKind::ALL.iter().map(|k| self.get(*k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Trims values, drops empties and case-insensitive duplicates (first
    /// spelling wins), and caps each key. Display order is preserved.
    pub fn normalized(&self) -> EntityList {
        let mut out = EntityList::default();
        for kind in EntityKind::ALL {
            let mut seen = HashSet::new();
            let values = out.get_mut(kind);
            for raw in self.get(kind) {
                let value = raw.trim();
                if value.is_empty() || !seen.insert(value.to_lowercase()) {
                    continue;
                }
                values.push(value.to_string());
                if values.len() >= ENTITY_CAP {
                    break;
                }
            }
        }
        out
    }

    /// Per-key union across lists: values lower-cased and trimmed, each key
    /// sorted and capped at `cap`.
    pub fn merge<'a, I>(lists: I, cap: usize) -> EntityList
    where
        I: IntoIterator<Item = &'a EntityList>,
    {
        let mut sets: [BTreeSet<String>; 5] = Default::default();
        for list in lists {
            for (i, kind) in EntityKind::ALL.iter().enumerate() {
                for raw in list.get(*kind) {
                    let value = raw.trim().to_lowercase();
                    if !value.is_empty() {
                        sets[i].insert(value);
                    }
                }
            }
        }

        let mut out = EntityList::default();
        for (i, kind) in EntityKind::ALL.iter().enumerate() {
            *out.get_mut(*kind) = std::mem::take(&mut sets[i]).into_iter().take(cap).collect();
        }
        out
    }

    /// Case-insensitive intersection test on one key.
    pub fn shares_any(&self, other: &EntityList, kind: EntityKind) -> bool {
        let mine: HashSet<String> = self
            .get(kind)
            .iter()
            .map(|v| v.trim().to_lowercase())
            .filter(|v| !v.is_empty())
            .collect();
        other
            .get(kind)
            .iter()
            .any(|v| mine.contains(&v.trim().to_lowercase()))
    }
}
