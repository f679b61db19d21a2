use crate::domain::entities::event::Event;
use crate::domain::values::category::Category;
use crate::domain::values::cluster_id::ClusterId;
use crate::domain::values::entities::EntityList;
use crate::domain::values::score::Score;
use crate::domain::values::sentiment::{Sentiment, StabilityTrend};
use crate::domain::values::source::SourceRef;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Canonical view synthesized from one cluster. Recomputed on demand and
/// never stored by the engine itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusedRecord {
    pub cluster_id: Option<ClusterId>,
    pub member_ids: Vec<String>,
    pub event_count: usize,
    pub timestamp: DateTime<Utc>,
    pub summary: String,
    pub full_text: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub location_name: Option<String>,
    pub category: Category,
    pub sentiment: Option<Sentiment>,
    pub stability_trend: StabilityTrend,
    pub confidence_score: Option<Score>,
    pub relevance_score: Option<Score>,
    pub source_list: Vec<SourceRef>,
    pub entity_list: EntityList,
}

impl FusedRecord {
    /// Single-event view: a straight copy, no merge rules applied.
    pub fn passthrough(event: &Event) -> Self {
        Self {
            cluster_id: event.cluster_id.clone(),
            member_ids: vec![event.id.clone()],
            event_count: 1,
            timestamp: event.timestamp,
            summary: event.summary.clone(),
            full_text: event.full_text.clone(),
            lat: event.lat,
            lon: event.lon,
            location_name: event.location_name.clone(),
            category: event.category,
            sentiment: event.sentiment,
            stability_trend: StabilityTrend::Neutral,
            confidence_score: event.confidence_score,
            relevance_score: event.relevance_score,
            source_list: event.source_list.clone(),
            entity_list: event.entity_list.clone(),
        }
    }

    pub fn text_length(&self) -> usize {
        self.summary.chars().count()
            + self.full_text.as_deref().map_or(0, |t| t.chars().count())
    }

    pub fn has_location(&self) -> bool {
        self.lat.is_some() || self.location_name.is_some() || !self.entity_list.locations.is_empty()
    }
}
