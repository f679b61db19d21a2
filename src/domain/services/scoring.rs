//! Confidence, relevance and priority scores.
//!
//! Table-driven and monotone so every number can be traced back to the
//! step that produced it. All outputs are clamped to [0, 1] and rounded to
//! two decimals through [`Score`].

use crate::domain::entities::event::Event;
use crate::domain::values::category::Category;
use crate::domain::values::entities::EntityList;
use crate::domain::values::score::Score;
use crate::domain::values::sentiment::Sentiment;

const CONFIDENCE_BASE: f64 = 0.30;

/// (minimum text length in chars, bonus), highest tier first.
const TEXT_LENGTH_TIERS: &[(usize, f64)] = &[
    (1000, 0.25),
    (500, 0.20),
    (200, 0.15),
    (100, 0.10),
    (50, 0.05),
];

/// (minimum entity count, bonus), highest tier first.
const ENTITY_COUNT_TIERS: &[(usize, f64)] = &[(15, 0.25), (10, 0.20), (5, 0.15), (2, 0.10)];

/// (age strictly below, in hours, bonus).
const RECENCY_TIERS: &[(f64, f64)] = &[(6.0, 0.20), (24.0, 0.15), (72.0, 0.10), (168.0, 0.05)];

/// (minimum cluster size, bonus), highest tier first.
const CLUSTER_SIZE_TIERS: &[(usize, f64)] = &[(5, 0.10), (3, 0.07), (2, 0.04)];

const RELEVANCE_FLOOR_POSITIVE: f64 = 0.20;

fn tier_bonus(value: usize, tiers: &[(usize, f64)]) -> f64 {
    tiers
        .iter()
        .find(|(min, _)| value >= *min)
        .map_or(0.0, |(_, bonus)| *bonus)
}

/// Inputs to [`ScoringEngine::confidence`], gathered from one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInputs {
    pub text_length: usize,
    pub entity_count: usize,
    pub has_location: bool,
    pub has_specific_category: bool,
    pub has_source: bool,
}

impl ConfidenceInputs {
    pub fn from_event(event: &Event) -> Self {
        Self {
            text_length: event.text_length(),
            entity_count: event.entity_list.count(),
            has_location: event.has_location(),
            has_specific_category: event.category.is_specific(),
            has_source: !event.source_list.is_empty(),
        }
    }
}

/// Stateless scorer. Construct once and share.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn confidence(&self, inputs: &ConfidenceInputs) -> Score {
        let mut score = CONFIDENCE_BASE;
        score += tier_bonus(inputs.text_length, TEXT_LENGTH_TIERS);
        score += tier_bonus(inputs.entity_count, ENTITY_COUNT_TIERS);
        if inputs.has_location {
            score += 0.15;
        }
        if inputs.has_specific_category {
            score += 0.15;
        }
        if inputs.has_source {
            score += 0.10;
        }
        Score::new(score)
    }

    pub fn relevance(
        &self,
        category: Category,
        sentiment: Option<Sentiment>,
        entities: &EntityList,
        text_length: usize,
    ) -> Score {
        let mut score = category.base_weight();
        match sentiment {
            Some(Sentiment::Negative) if category.is_high_risk() => score += 0.10,
            Some(Sentiment::Positive) => {
                score = (score - 0.05).max(RELEVANCE_FLOOR_POSITIVE);
            }
            _ => {}
        }
        if !entities.locations.is_empty() && !entities.organizations.is_empty() {
            score += 0.05;
        }
        if text_length > 500 {
            score += 0.05;
        }
        Score::new(score)
    }

    pub fn priority(
        &self,
        relevance: Score,
        confidence: Score,
        recency_hours: f64,
        cluster_size: usize,
    ) -> Score {
        let recency_bonus = RECENCY_TIERS
            .iter()
            .find(|(below, _)| recency_hours < *below)
            .map_or(0.0, |(_, bonus)| *bonus);
        let cluster_bonus = tier_bonus(cluster_size, CLUSTER_SIZE_TIERS);
        Score::new(
            0.5 * relevance.value() + 0.3 * confidence.value() + recency_bonus + cluster_bonus,
        )
    }

    /// Confidence for a raw event, ignoring any stored value.
    pub fn event_confidence(&self, event: &Event) -> Score {
        self.confidence(&ConfidenceInputs::from_event(event))
    }

    /// Relevance for a raw event, ignoring any stored value.
    pub fn event_relevance(&self, event: &Event) -> Score {
        self.relevance(
            event.category,
            event.sentiment,
            &event.entity_list,
            event.text_length(),
        )
    }
}
