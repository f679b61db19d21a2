//! Partition a working set of events into clusters of the same incident.
//!
//! Two grouping modes:
//!
//! - [`ClusterMode::SeedAnchored`] (default): walk events in input order;
//!   each unassigned event seeds a cluster and absorbs every later
//!   unassigned event that links to the *seed*. Members are never compared
//!   with each other, so the result depends on input order.
//! - [`ClusterMode::Transitive`]: union-find over every linked pair. Order
//!   independent, but one bridging event can merge two otherwise unrelated
//!   groups.
//!
//! In both modes events that already share a non-null cluster id stay
//! together, and a cluster reuses an existing id instead of minting one.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::entities::event::Event;
use crate::domain::ports::link_policy::LinkPolicy;
use crate::domain::values::cluster_id::ClusterId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterMode {
    #[default]
    SeedAnchored,
    Transitive,
}

impl fmt::Display for ClusterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterMode::SeedAnchored => write!(f, "seed_anchored"),
            ClusterMode::Transitive => write!(f, "transitive"),
        }
    }
}

impl FromStr for ClusterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "seed_anchored" | "seed" => Ok(ClusterMode::SeedAnchored),
            "transitive" | "union_find" => Ok(ClusterMode::Transitive),
            _ => Err(format!(
                "Invalid cluster mode: '{s}'. Use 'seed_anchored' or 'transitive'"
            )),
        }
    }
}

/// One group of events believed to describe the same incident.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub id: ClusterId,
    pub events: Vec<Event>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn is_singleton(&self) -> bool {
        self.events.len() == 1
    }

    pub fn member_ids(&self) -> Vec<String> {
        self.events.iter().map(|e| e.id.clone()).collect()
    }
}

/// `cluster id -> member event ids`, the shape callers persist.
pub fn cluster_mapping(clusters: &[Cluster]) -> BTreeMap<ClusterId, Vec<String>> {
    clusters
        .iter()
        .map(|c| (c.id.clone(), c.member_ids()))
        .collect()
}

type IdSource = Box<dyn Fn() -> ClusterId + Send + Sync>;

pub struct ClusterBuilder {
    policy: Arc<dyn LinkPolicy>,
    mode: ClusterMode,
    mint_id: IdSource,
}

impl ClusterBuilder {
    pub fn new(policy: Arc<dyn LinkPolicy>, mode: ClusterMode) -> Self {
        Self {
            policy,
            mode,
            mint_id: Box::new(ClusterId::mint),
        }
    }

    /// Replace the id generator for fresh clusters.
    pub fn with_id_source<F>(mut self, mint_id: F) -> Self
    where
        F: Fn() -> ClusterId + Send + Sync + 'static,
    {
        self.mint_id = Box::new(mint_id);
        self
    }

    pub fn mode(&self) -> ClusterMode {
        self.mode
    }

    /// Clusters come back ordered by the input position of their first
    /// member; members keep input order. Singletons are included.
    pub fn build(&self, events: &[Event]) -> Vec<Cluster> {
        if events.is_empty() {
            return Vec::new();
        }
        let groups = match self.mode {
            ClusterMode::SeedAnchored => self.seed_anchored_groups(events),
            ClusterMode::Transitive => self.transitive_groups(events),
        };

        let clusters: Vec<Cluster> = groups
            .into_iter()
            .map(|members| {
                // Seed-anchored clusters take only the seed's id; transitive
                // components take the first id found among members.
                let existing = match self.mode {
                    ClusterMode::SeedAnchored => events[members[0]].cluster_id.clone(),
                    ClusterMode::Transitive => {
                        members.iter().find_map(|&i| events[i].cluster_id.clone())
                    }
                };
                let id = existing.unwrap_or_else(|| (self.mint_id)());
                Cluster {
                    id,
                    events: members.into_iter().map(|i| events[i].clone()).collect(),
                }
            })
            .collect();

        debug!(
            policy = self.policy.name(),
            mode = %self.mode,
            events = events.len(),
            clusters = clusters.len(),
            "clusters built"
        );
        clusters
    }

    fn linked(&self, a: &Event, b: &Event) -> bool {
        same_prior_cluster(a, b) || self.policy.should_link(a, b)
    }

    fn seed_anchored_groups(&self, events: &[Event]) -> Vec<Vec<usize>> {
        let mut assigned = vec![false; events.len()];
        let mut groups = Vec::new();

        for seed_idx in 0..events.len() {
            if assigned[seed_idx] {
                continue;
            }
            assigned[seed_idx] = true;
            let seed = &events[seed_idx];
            let mut members = vec![seed_idx];

            for cand_idx in (seed_idx + 1)..events.len() {
                if assigned[cand_idx] {
                    continue;
                }
                if self.linked(seed, &events[cand_idx]) {
                    assigned[cand_idx] = true;
                    members.push(cand_idx);
                }
            }
            groups.push(members);
        }
        groups
    }

    fn transitive_groups(&self, events: &[Event]) -> Vec<Vec<usize>> {
        let mut sets = DisjointSets::new(events.len());
        for i in 0..events.len() {
            for j in (i + 1)..events.len() {
                if sets.find(i) != sets.find(j) && self.linked(&events[i], &events[j]) {
                    sets.union(i, j);
                }
            }
        }

        // Root -> position of the group in output, first member order.
        let mut slot: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for i in 0..events.len() {
            let root = sets.find(i);
            let pos = *slot.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[pos].push(i);
        }
        groups
    }
}

fn same_prior_cluster(a: &Event, b: &Event) -> bool {
    matches!((&a.cluster_id, &b.cluster_id), (Some(x), Some(y)) if x == y)
}

/// Union-find with path halving and union by size.
struct DisjointSets {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSets {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disjoint_sets() {
        let mut sets = DisjointSets::new(5);
        sets.union(0, 1);
        sets.union(3, 4);
        sets.union(1, 4);
        assert_eq!(sets.find(0), sets.find(3));
        assert_ne!(sets.find(0), sets.find(2));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("seed-anchored".parse(), Ok(ClusterMode::SeedAnchored));
        assert_eq!("TRANSITIVE".parse(), Ok(ClusterMode::Transitive));
        assert!("both".parse::<ClusterMode>().is_err());
    }
}
