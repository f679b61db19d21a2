use crate::domain::error::DomainError;
use crate::domain::values::category::Category;
use crate::domain::values::cluster_id::ClusterId;
use crate::domain::values::entities::EntityList;
use crate::domain::values::score::Score;
use crate::domain::values::sentiment::Sentiment;
use crate::domain::values::source::SourceRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest summary kept on an event, in characters.
pub const MAX_SUMMARY_CHARS: usize = 500;

/// One intelligence report as delivered by the enrichment stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub summary: String,
    pub full_text: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub location_name: Option<String>,
    pub category: Category,
    pub sentiment: Option<Sentiment>,
    pub confidence_score: Option<Score>,
    pub relevance_score: Option<Score>,
    pub source_list: Vec<SourceRef>,
    pub entity_list: EntityList,
    pub cluster_id: Option<ClusterId>,
}

impl Event {
    pub fn new(category: Category, summary: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp,
            summary: truncate_chars(&summary.into(), MAX_SUMMARY_CHARS),
            full_text: None,
            lat: None,
            lon: None,
            location_name: None,
            category,
            sentiment: None,
            confidence_score: None,
            relevance_score: None,
            source_list: Vec::new(),
            entity_list: EntityList::default(),
            cluster_id: None,
        }
    }

    /// Full text when present and non-blank, otherwise the summary.
    pub fn best_text(&self) -> &str {
        match self.full_text.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => &self.summary,
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// Any geographic signal at all: coordinates, a name, or a location entity.
    pub fn has_location(&self) -> bool {
        self.coordinates().is_some()
            || self
                .location_name
                .as_deref()
                .is_some_and(|n| !n.trim().is_empty())
            || !self.entity_list.locations.is_empty()
    }

    /// Characters of summary plus full text, used by the confidence score.
    pub fn text_length(&self) -> usize {
        self.summary.chars().count()
            + self.full_text.as_deref().map_or(0, |t| t.chars().count())
    }

    pub fn confidence_or_zero(&self) -> f64 {
        self.confidence_score.map_or(0.0, |s| s.value())
    }
}

/// Lenient input shape: every field optional so one bad record can be
/// rejected on its own instead of failing a whole batch.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawEvent {
    pub id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub summary: Option<String>,
    #[serde(alias = "full_text")]
    pub full_text: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(alias = "location_name")]
    pub location_name: Option<String>,
    pub category: Option<String>,
    pub sentiment: Option<String>,
    #[serde(alias = "confidence_score")]
    pub confidence_score: Option<f64>,
    #[serde(alias = "relevance_score")]
    pub relevance_score: Option<f64>,
    #[serde(alias = "source_list")]
    pub source_list: Vec<SourceRef>,
    #[serde(alias = "entity_list")]
    pub entity_list: EntityList,
    #[serde(alias = "cluster_id")]
    pub cluster_id: Option<String>,
}

impl TryFrom<RawEvent> for Event {
    type Error = DomainError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        let label = raw.id.clone().unwrap_or_else(|| "<no id>".into());
        let timestamp = raw
            .timestamp
            .ok_or_else(|| DomainError::InvalidEvent(format!("{label}: missing timestamp")))?;
        let category = raw
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(Category::classify)
            .ok_or_else(|| DomainError::InvalidEvent(format!("{label}: missing category")))?;
        let summary = raw
            .summary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DomainError::InvalidEvent(format!("{label}: missing summary")))?;

        // Half a coordinate pair, or one off the globe, is no coordinate.
        let (lat, lon) = match (raw.lat, raw.lon) {
            (Some(lat), Some(lon))
                if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) =>
            {
                (Some(lat), Some(lon))
            }
            _ => (None, None),
        };

        Ok(Event {
            id: raw
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            timestamp,
            summary: truncate_chars(summary, MAX_SUMMARY_CHARS),
            full_text: raw.full_text.filter(|t| !t.trim().is_empty()),
            lat,
            lon,
            location_name: raw
                .location_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            category,
            sentiment: raw.sentiment.and_then(|s| s.parse().ok()),
            confidence_score: raw.confidence_score.map(Score::new),
            relevance_score: raw.relevance_score.map(Score::new),
            source_list: raw.source_list,
            entity_list: raw.entity_list.normalized(),
            cluster_id: raw
                .cluster_id
                .filter(|c| !c.trim().is_empty())
                .map(ClusterId::new),
        })
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
