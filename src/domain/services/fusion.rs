//! Merge a cluster of events into one canonical record.
//!
//! Pure and deterministic: the same events in the same order always fuse to
//! the same record, and caller-owned events are never modified.
//!
//! Merge rules for two or more events:
//!
//! | field            | rule                                                        |
//! |------------------|-------------------------------------------------------------|
//! | timestamp        | earliest                                                    |
//! | summary/location | from the primary event (highest confidence, then longest summary, then first) |
//! | full text        | distinct texts by lower-cased prefix fingerprint, joined     |
//! | category         | most frequent, ties to first seen                           |
//! | sentiment        | most frequent present value, ties to first seen             |
//! | stability trend  | first vs last sentiment in time order                       |
//! | sources          | union by url, first-seen order                              |
//! | entities         | per-key lower-cased union, sorted, capped                   |
//! | confidence       | mean of present values plus a multi-source bonus            |
//! | relevance        | maximum present value                                       |

use std::collections::HashMap;
use std::hash::Hash;

use tracing::debug;

use crate::domain::entities::event::Event;
use crate::domain::entities::fused_record::FusedRecord;
use crate::domain::error::DomainError;
use crate::domain::services::clustering::Cluster;
use crate::domain::services::scoring::{ConfidenceInputs, ScoringEngine};
use crate::domain::values::entities::{EntityList, ENTITY_CAP};
use crate::domain::values::score::Score;
use crate::domain::values::sentiment::StabilityTrend;
use crate::domain::values::source::merge_sources;

/// (minimum distinct sources, confidence bonus), highest tier first.
const SOURCE_BONUS_TIERS: &[(usize, f64)] = &[(5, 0.15), (3, 0.10), (2, 0.05)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FusionConfig {
    /// Values kept per entity key after merging.
    pub entity_cap: usize,
    /// Characters of lower-cased full text used to spot duplicate texts.
    pub fingerprint_len: usize,
    /// Placed between distinct full texts.
    pub separator: String,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            entity_cap: ENTITY_CAP,
            fingerprint_len: 200,
            separator: "\n\n---\n\n".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FusionEngine {
    config: FusionConfig,
    scoring: ScoringEngine,
}

impl FusionEngine {
    pub fn new(config: FusionConfig, scoring: ScoringEngine) -> Self {
        Self { config, scoring }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Fuse a built cluster; the record carries the cluster's id.
    pub fn fuse_cluster(&self, cluster: &Cluster) -> Result<FusedRecord, DomainError> {
        let mut record = self.fuse(&cluster.events)?;
        record.cluster_id = Some(cluster.id.clone());
        Ok(record)
    }

    pub fn fuse(&self, events: &[Event]) -> Result<FusedRecord, DomainError> {
        match events {
            [] => Err(DomainError::EmptyCluster),
            [single] => Ok(FusedRecord::passthrough(single)),
            _ => Ok(self.merge(events)),
        }
    }

    fn merge(&self, events: &[Event]) -> FusedRecord {
        let primary = primary_event(events);
        let timestamp = events
            .iter()
            .map(|e| e.timestamp)
            .min()
            .unwrap_or(primary.timestamp);

        let category = mode(events.iter().map(|e| e.category)).unwrap_or_default();
        let sentiment = mode(events.iter().filter_map(|e| e.sentiment));
        let source_list = merge_sources(events.iter().map(|e| e.source_list.as_slice()));
        let entity_list =
            EntityList::merge(events.iter().map(|e| &e.entity_list), self.config.entity_cap);
        let full_text = self.merge_full_text(events);

        let shared_cluster = events
            .first()
            .and_then(|e| e.cluster_id.clone())
            .filter(|id| events.iter().all(|e| e.cluster_id.as_ref() == Some(id)));

        let mut record = FusedRecord {
            cluster_id: shared_cluster,
            member_ids: events.iter().map(|e| e.id.clone()).collect(),
            event_count: events.len(),
            timestamp,
            summary: primary.summary.clone(),
            full_text,
            lat: primary.lat,
            lon: primary.lon,
            location_name: primary.location_name.clone(),
            category,
            sentiment,
            stability_trend: stability_trend(events),
            confidence_score: None,
            relevance_score: None,
            source_list,
            entity_list,
        };
        record.confidence_score = Some(self.fused_confidence(events, &record));
        record.relevance_score = Some(self.fused_relevance(events, &record));

        debug!(
            events = record.event_count,
            sources = record.source_list.len(),
            category = %record.category,
            confidence = ?record.confidence_score,
            "cluster fused"
        );
        record
    }

    fn merge_full_text(&self, events: &[Event]) -> Option<String> {
        let mut seen: Vec<String> = Vec::new();
        let mut texts: Vec<&str> = Vec::new();
        for text in events.iter().filter_map(|e| e.full_text.as_deref()) {
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            let fingerprint: String = text
                .to_lowercase()
                .chars()
                .take(self.config.fingerprint_len)
                .collect();
            if seen.contains(&fingerprint) {
                continue;
            }
            seen.push(fingerprint);
            texts.push(text);
        }
        if texts.is_empty() {
            None
        } else {
            Some(texts.join(self.config.separator.as_str()))
        }
    }

    fn fused_confidence(&self, events: &[Event], record: &FusedRecord) -> Score {
        let present: Vec<f64> = events
            .iter()
            .filter_map(|e| e.confidence_score.map(|s| s.value()))
            .collect();
        let base = if present.is_empty() {
            self.scoring
                .confidence(&ConfidenceInputs {
                    text_length: record.text_length(),
                    entity_count: record.entity_list.count(),
                    has_location: record.has_location(),
                    has_specific_category: record.category.is_specific(),
                    has_source: !record.source_list.is_empty(),
                })
                .value()
        } else {
            present.iter().sum::<f64>() / present.len() as f64
        };
        let bonus = SOURCE_BONUS_TIERS
            .iter()
            .find(|(min, _)| record.source_list.len() >= *min)
            .map_or(0.0, |(_, b)| *b);
        Score::new(base + bonus)
    }

    fn fused_relevance(&self, events: &[Event], record: &FusedRecord) -> Score {
        let max_present = events
            .iter()
            .filter_map(|e| e.relevance_score)
            .fold(None, |acc: Option<Score>, s| match acc {
                Some(best) if best.value() >= s.value() => Some(best),
                _ => Some(s),
            });
        max_present.unwrap_or_else(|| {
            self.scoring.relevance(
                record.category,
                record.sentiment,
                &record.entity_list,
                record.text_length(),
            )
        })
    }
}

/// Highest confidence (absent counts as 0.0), then longest summary, then
/// earliest in input order.
fn primary_event(events: &[Event]) -> &Event {
    let mut best = &events[0];
    for event in &events[1..] {
        let (conf, best_conf) = (event.confidence_or_zero(), best.confidence_or_zero());
        let longer = event.summary.chars().count() > best.summary.chars().count();
        if conf > best_conf || (conf == best_conf && longer) {
            best = event;
        }
    }
    best
}

/// Most frequent value; ties go to the value seen first.
fn mode<T, I>(values: I) -> Option<T>
where
    T: Copy + Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, usize> = HashMap::new();
    let mut order: Vec<T> = Vec::new();
    for value in values {
        let count = counts.entry(value).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }
    let mut best: Option<(T, usize)> = None;
    for value in order {
        let count = counts[&value];
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(v, _)| v)
}

/// Compare the earliest and latest sentiment-bearing events. Equal
/// timestamps keep input order.
fn stability_trend(events: &[Event]) -> StabilityTrend {
    let mut with_sentiment: Vec<&Event> = events.iter().filter(|e| e.sentiment.is_some()).collect();
    if with_sentiment.len() < 2 {
        return StabilityTrend::Neutral;
    }
    with_sentiment.sort_by_key(|e| e.timestamp);
    match (
        with_sentiment.first().and_then(|e| e.sentiment),
        with_sentiment.last().and_then(|e| e.sentiment),
    ) {
        (Some(first), Some(last)) => StabilityTrend::between(first, last),
        _ => StabilityTrend::Neutral,
    }
}
