//! Priority ranking of events and fused clusters.

use crate::domain::entities::event::Event;
use crate::domain::entities::fused_record::FusedRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::event_repository::{EventFilter, EventRepository};
use crate::domain::services::scoring::ScoringEngine;
use crate::domain::values::category::Category;
use crate::domain::values::cluster_id::ClusterId;
use crate::domain::values::score::Score;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Event,
    Cluster,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedItem {
    pub kind: ItemKind,
    /// Event id, or cluster id for fused records.
    pub id: String,
    pub category: Category,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
    pub cluster_size: usize,
    pub confidence: Score,
    pub relevance: Score,
    pub priority: Score,
}

fn hours_since(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - timestamp).num_seconds() as f64 / 3600.0
}

/// Score one stored event. Stored scores win; missing ones are computed.
pub fn rank_event(
    scoring: &ScoringEngine,
    event: &Event,
    cluster_size: usize,
    now: DateTime<Utc>,
) -> RankedItem {
    let confidence = event
        .confidence_score
        .unwrap_or_else(|| scoring.event_confidence(event));
    let relevance = event
        .relevance_score
        .unwrap_or_else(|| scoring.event_relevance(event));
    RankedItem {
        kind: ItemKind::Event,
        id: event.id.clone(),
        category: event.category,
        summary: event.summary.clone(),
        timestamp: event.timestamp,
        cluster_size,
        confidence,
        relevance,
        priority: scoring.priority(
            relevance,
            confidence,
            hours_since(event.timestamp, now),
            cluster_size,
        ),
    }
}

pub fn rank_fused(scoring: &ScoringEngine, record: &FusedRecord, now: DateTime<Utc>) -> RankedItem {
    let confidence = record.confidence_score.unwrap_or_default();
    let relevance = record.relevance_score.unwrap_or_default();
    RankedItem {
        kind: ItemKind::Cluster,
        id: record
            .cluster_id
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_else(|| record.member_ids.join(",")),
        category: record.category,
        summary: record.summary.clone(),
        timestamp: record.timestamp,
        cluster_size: record.event_count,
        confidence,
        relevance,
        priority: scoring.priority(
            relevance,
            confidence,
            hours_since(record.timestamp, now),
            record.event_count,
        ),
    }
}

/// Highest priority first; newer first on ties, then by id.
pub fn sort_ranked(items: &mut [RankedItem]) {
    items.sort_by(|a, b| {
        b.priority
            .value()
            .partial_cmp(&a.priority.value())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.timestamp.cmp(&a.timestamp))
            .then_with(|| a.id.cmp(&b.id))
    });
}

pub struct RankUseCase {
    repo: Arc<dyn EventRepository>,
    scoring: ScoringEngine,
}

impl RankUseCase {
    pub fn new(repo: Arc<dyn EventRepository>, scoring: ScoringEngine) -> Self {
        Self { repo, scoring }
    }

    /// Rank every stored event from the last `hours_back` hours. Cluster
    /// size counts members of the same cluster within that window.
    pub fn execute(
        &self,
        hours_back: u32,
        limit: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedItem>, DomainError> {
        let events = self.repo.query(&EventFilter::recent(now, hours_back))?;

        let mut sizes: HashMap<&ClusterId, usize> = HashMap::new();
        for cluster_id in events.iter().filter_map(|e| e.cluster_id.as_ref()) {
            *sizes.entry(cluster_id).or_default() += 1;
        }

        let mut items: Vec<RankedItem> = events
            .iter()
            .map(|e| {
                let size = e
                    .cluster_id
                    .as_ref()
                    .and_then(|c| sizes.get(c).copied())
                    .unwrap_or(1);
                rank_event(&self.scoring, e, size, now)
            })
            .collect();
        sort_ranked(&mut items);
        if let Some(limit) = limit {
            items.truncate(limit);
        }
        Ok(items)
    }
}
