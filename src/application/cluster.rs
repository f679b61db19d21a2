use crate::domain::entities::event::Event;
use crate::domain::error::DomainError;
use crate::domain::ports::event_repository::{EventFilter, EventRepository};
use crate::domain::services::clustering::{cluster_mapping, Cluster, ClusterBuilder};
use crate::domain::values::cluster_id::ClusterId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Which events one run looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkingSet {
    /// Ungrouped events from the last `hours_back` hours.
    Recent { hours_back: u32 },
    /// Exactly these events, whether grouped or not.
    Ids(Vec<String>),
}

#[derive(Debug, Serialize)]
pub struct ClusterRun {
    pub events_considered: usize,
    pub clusters: Vec<Cluster>,
    pub mapping: BTreeMap<ClusterId, Vec<String>>,
    /// Rows written back to storage (members of multi-event clusters).
    pub assigned: usize,
}

impl ClusterRun {
    pub fn multi_event_clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter().filter(|c| c.len() >= 2)
    }
}

pub struct ClusterUseCase {
    repo: Arc<dyn EventRepository>,
    builder: ClusterBuilder,
}

impl ClusterUseCase {
    pub fn new(repo: Arc<dyn EventRepository>, builder: ClusterBuilder) -> Self {
        Self { repo, builder }
    }

    pub fn select(
        &self,
        working_set: &WorkingSet,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, DomainError> {
        match working_set {
            WorkingSet::Recent { hours_back } => self.repo.query(&EventFilter {
                unclustered_only: true,
                ..EventFilter::recent(now, *hours_back)
            }),
            WorkingSet::Ids(ids) => self.repo.get_by_ids(ids),
        }
    }

    /// Build clusters over the working set and persist the ids of every
    /// multi-event cluster. Singletons stay ungrouped in storage so they can
    /// still join events that arrive later.
    pub fn execute(
        &self,
        working_set: &WorkingSet,
        now: DateTime<Utc>,
    ) -> Result<ClusterRun, DomainError> {
        let events = self.select(working_set, now)?;
        let clusters = self.builder.build(&events);

        let assignments: Vec<(String, ClusterId)> = clusters
            .iter()
            .filter(|c| c.len() >= 2)
            .flat_map(|c| c.events.iter().map(|e| (e.id.clone(), c.id.clone())))
            .collect();
        let assigned = if assignments.is_empty() {
            0
        } else {
            self.repo.assign_clusters(&assignments)?
        };

        let run = ClusterRun {
            events_considered: events.len(),
            mapping: cluster_mapping(&clusters),
            clusters,
            assigned,
        };
        info!(
            events = run.events_considered,
            clusters = run.clusters.len(),
            multi = run.multi_event_clusters().count(),
            assigned = run.assigned,
            mode = %self.builder.mode(),
            "clustering finished"
        );
        Ok(run)
    }
}
