//! Full dedup run: cluster, then fuse, then rank.
//!
//! Clustering finishes for the whole working set before any fusion starts.
//! Fusions of different clusters are independent and run concurrently on
//! the blocking pool; results are put back in cluster order so the report
//! is deterministic.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::application::cluster::{ClusterUseCase, WorkingSet};
use crate::application::rank::{rank_event, rank_fused, sort_ranked, RankedItem};
use crate::domain::entities::fused_record::FusedRecord;
use crate::domain::error::DomainError;
use crate::domain::services::fusion::FusionEngine;
use crate::domain::services::scoring::ScoringEngine;
use crate::domain::values::cluster_id::ClusterId;

#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_at: DateTime<Utc>,
    pub working_set: WorkingSet,
    pub events_considered: usize,
    pub clusters_total: usize,
    pub singletons: usize,
    pub assigned: usize,
    pub mapping: BTreeMap<ClusterId, Vec<String>>,
    pub fused: Vec<FusedRecord>,
    pub fusion_failures: usize,
    /// Every event in the working set, scored with its cluster size.
    pub events: Vec<RankedItem>,
    /// Display list: one item per fused cluster plus each singleton,
    /// highest priority first.
    pub ranked: Vec<RankedItem>,
}

pub struct DedupRunUseCase {
    clusters: Arc<ClusterUseCase>,
    engine: Arc<FusionEngine>,
    scoring: ScoringEngine,
}

impl DedupRunUseCase {
    pub fn new(
        clusters: Arc<ClusterUseCase>,
        engine: Arc<FusionEngine>,
        scoring: ScoringEngine,
    ) -> Self {
        Self {
            clusters,
            engine,
            scoring,
        }
    }

    pub async fn execute(
        &self,
        working_set: WorkingSet,
        now: DateTime<Utc>,
    ) -> Result<RunReport, DomainError> {
        let run = self.clusters.execute(&working_set, now)?;

        let mut tasks = JoinSet::new();
        for (idx, cluster) in run.clusters.iter().enumerate() {
            if cluster.len() < 2 {
                continue;
            }
            let engine = Arc::clone(&self.engine);
            let cluster = cluster.clone();
            tasks.spawn_blocking(move || (idx, engine.fuse_cluster(&cluster)));
        }

        let mut fused: Vec<(usize, FusedRecord)> = Vec::new();
        let mut fusion_failures = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, Ok(record))) => fused.push((idx, record)),
                Ok((idx, Err(e))) => {
                    warn!(cluster = idx, error = %e, "fusion failed");
                    fusion_failures += 1;
                }
                Err(e) => {
                    error!(error = %e, "fusion task did not complete");
                    fusion_failures += 1;
                }
            }
        }
        fused.sort_by_key(|(idx, _)| *idx);
        let fused: Vec<FusedRecord> = fused.into_iter().map(|(_, r)| r).collect();

        let mut events: Vec<RankedItem> = run
            .clusters
            .iter()
            .flat_map(|c| {
                c.events
                    .iter()
                    .map(move |e| rank_event(&self.scoring, e, c.len(), now))
            })
            .collect();
        sort_ranked(&mut events);

        let mut ranked: Vec<RankedItem> = fused
            .iter()
            .map(|r| rank_fused(&self.scoring, r, now))
            .chain(
                run.clusters
                    .iter()
                    .filter(|c| c.is_singleton())
                    .map(|c| rank_event(&self.scoring, &c.events[0], 1, now)),
            )
            .collect();
        sort_ranked(&mut ranked);

        let singletons = run.clusters.iter().filter(|c| c.is_singleton()).count();
        info!(
            events = run.events_considered,
            clusters = run.clusters.len(),
            fused = fused.len(),
            singletons,
            failures = fusion_failures,
            "dedup run finished"
        );

        Ok(RunReport {
            run_at: now,
            working_set,
            events_considered: run.events_considered,
            clusters_total: run.clusters.len(),
            singletons,
            assigned: run.assigned,
            mapping: run.mapping,
            fused,
            fusion_failures,
            events,
            ranked,
        })
    }
}
