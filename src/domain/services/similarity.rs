//! Pairwise "same incident?" decision.
//!
//! Category and time act as hard gates. Past the gates, location agreement
//! lowers the text-overlap bar; very strong text overlap links on its own.

use chrono::Duration;
use serde::Serialize;
use tracing::trace;

use crate::domain::entities::event::Event;
use crate::domain::ports::link_policy::LinkPolicy;
use crate::domain::services::geo::{GeoMatcher, DEFAULT_RADIUS_KM};
use crate::domain::services::text::TextMatcher;

/// Widest time window accepted from configuration: one year.
pub const MAX_TIME_WINDOW_HOURS: i64 = 24 * 365;

/// Tunable linking thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchConfig {
    /// Maximum gap between two event timestamps, in hours.
    pub time_window_hours: i64,
    /// Coordinates closer than this count as the same place.
    pub geo_radius_km: f64,
    /// Text similarity needed when locations agree.
    pub text_threshold_with_geo: f64,
    /// Text similarity that links without any location signal.
    pub text_threshold_alone: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            time_window_hours: 24,
            geo_radius_km: DEFAULT_RADIUS_KM,
            text_threshold_with_geo: 0.4,
            text_threshold_alone: 0.6,
        }
    }
}

/// Breakdown of one pairwise decision, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinkDecision {
    pub same_category: bool,
    pub within_window: bool,
    /// `None` when a gate failed and the signal was never computed.
    pub geo_match: Option<bool>,
    pub text_similarity: Option<f64>,
    pub linked: bool,
}

#[derive(Debug, Clone)]
pub struct SimilarityMatcher {
    config: MatchConfig,
    geo: GeoMatcher,
    text: TextMatcher,
}

impl Default for SimilarityMatcher {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}

impl SimilarityMatcher {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            geo: GeoMatcher::new(config.geo_radius_km),
            text: TextMatcher::new(),
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn geo(&self) -> &GeoMatcher {
        &self.geo
    }

    pub fn text(&self) -> &TextMatcher {
        &self.text
    }

    pub fn evaluate(&self, a: &Event, b: &Event) -> LinkDecision {
        let mut decision = LinkDecision {
            same_category: a.category == b.category,
            within_window: false,
            geo_match: None,
            text_similarity: None,
            linked: false,
        };
        if !decision.same_category {
            return decision;
        }

        // A window too wide for the calendar admits every pair.
        let gap = (a.timestamp - b.timestamp).abs();
        decision.within_window = Duration::try_hours(self.config.time_window_hours)
            .map_or(true, |window| gap <= window);
        if !decision.within_window {
            return decision;
        }

        let geo = self.geo.locations_match(a, b);
        let text = self.text.similarity(a.best_text(), b.best_text());
        decision.geo_match = Some(geo);
        decision.text_similarity = Some(text);
        decision.linked = (geo && text >= self.config.text_threshold_with_geo)
            || text >= self.config.text_threshold_alone;
        decision
    }
}

impl LinkPolicy for SimilarityMatcher {
    fn name(&self) -> &'static str {
        "similarity"
    }

    fn should_link(&self, a: &Event, b: &Event) -> bool {
        let decision = self.evaluate(a, b);
        trace!(
            a = %a.id,
            b = %b.id,
            geo = ?decision.geo_match,
            text = ?decision.text_similarity,
            linked = decision.linked,
            "pair evaluated"
        );
        decision.linked
    }
}
