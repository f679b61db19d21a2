use crate::domain::entities::fused_record::FusedRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::event_repository::{EventFilter, EventRepository};
use crate::domain::services::clustering::Cluster;
use crate::domain::services::fusion::FusionEngine;
use crate::domain::values::cluster_id::ClusterId;
use std::sync::Arc;

pub struct FuseUseCase {
    repo: Arc<dyn EventRepository>,
    engine: Arc<FusionEngine>,
}

impl FuseUseCase {
    pub fn new(repo: Arc<dyn EventRepository>, engine: Arc<FusionEngine>) -> Self {
        Self { repo, engine }
    }

    /// Fuse the stored members of one cluster.
    pub fn execute(&self, cluster_id: &ClusterId) -> Result<FusedRecord, DomainError> {
        let events = self.repo.query(&EventFilter {
            cluster_id: Some(cluster_id.clone()),
            ..Default::default()
        })?;
        if events.is_empty() {
            return Err(DomainError::NotFound(format!("Cluster {cluster_id}")));
        }
        self.engine.fuse_cluster(&Cluster {
            id: cluster_id.clone(),
            events,
        })
    }
}
