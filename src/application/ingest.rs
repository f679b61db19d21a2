use crate::domain::entities::event::{Event, RawEvent};
use crate::domain::error::DomainError;
use crate::domain::ports::event_repository::EventRepository;
use crate::domain::services::scoring::ScoringEngine;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

pub struct IngestUseCase {
    repo: Arc<dyn EventRepository>,
    scoring: ScoringEngine,
}

#[derive(Debug, Default, Serialize)]
pub struct IngestReport {
    pub accepted: usize,
    pub rejected: usize,
    pub ids: Vec<String>,
    pub errors: Vec<String>,
}

impl IngestUseCase {
    pub fn new(repo: Arc<dyn EventRepository>, scoring: ScoringEngine) -> Self {
        Self { repo, scoring }
    }

    /// Validate one raw record and fill in any score upstream left absent.
    /// Scores already present are kept as delivered.
    pub fn prepare(&self, raw: RawEvent) -> Result<Event, DomainError> {
        let mut event = Event::try_from(raw)?;
        if event.confidence_score.is_none() {
            event.confidence_score = Some(self.scoring.event_confidence(&event));
        }
        if event.relevance_score.is_none() {
            event.relevance_score = Some(self.scoring.event_relevance(&event));
        }
        Ok(event)
    }

    /// Store a batch. Malformed records are skipped and reported; the valid
    /// ones are written in one transaction, so a storage failure stores
    /// nothing.
    pub fn execute(&self, records: Vec<RawEvent>) -> Result<IngestReport, DomainError> {
        let mut report = IngestReport::default();
        let mut events = Vec::with_capacity(records.len());
        for raw in records {
            match self.prepare(raw) {
                Ok(event) => events.push(event),
                Err(DomainError::InvalidEvent(reason)) => {
                    warn!(%reason, "rejected malformed event");
                    report.rejected += 1;
                    report.errors.push(reason);
                }
                Err(e) => return Err(e),
            }
        }

        if !events.is_empty() {
            report.accepted = self.repo.add_batch(&events)?;
        }
        report.ids = events.into_iter().map(|e| e.id).collect();
        info!(
            accepted = report.accepted,
            rejected = report.rejected,
            "ingest finished"
        );
        Ok(report)
    }
}
