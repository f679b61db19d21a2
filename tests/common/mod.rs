//! Shared test helpers.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use intelfuse::domain::entities::event::{Event, RawEvent};
use intelfuse::domain::values::category::Category;
use intelfuse::domain::values::score::Score;
use intelfuse::domain::values::source::SourceRef;
use intelfuse::infrastructure::config::Settings;
use intelfuse::IntelFuse;

pub const BERLIN: (f64, f64) = (52.5200, 13.4050);
pub const POTSDAM: (f64, f64) = (52.3906, 13.0645);
pub const MUNICH: (f64, f64) = (48.1351, 11.5820);

pub fn setup() -> IntelFuse {
    let settings = Settings {
        db_path: ":memory:".into(),
        ..Settings::default()
    };
    IntelFuse::new(&settings).unwrap()
}

/// Fixed reference instant so time-based assertions are stable.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

pub fn at(hours: i64) -> DateTime<Utc> {
    base_time() + Duration::hours(hours)
}

pub fn make_event(id: &str, category: Category, summary: &str, timestamp: DateTime<Utc>) -> Event {
    let mut event = Event::new(category, summary, timestamp);
    event.id = id.to_string();
    event
}

pub fn located(mut event: Event, (lat, lon): (f64, f64)) -> Event {
    event.lat = Some(lat);
    event.lon = Some(lon);
    event
}

pub fn named_place(mut event: Event, name: &str) -> Event {
    event.location_name = Some(name.to_string());
    event
}

pub fn scored(mut event: Event, confidence: f64, relevance: f64) -> Event {
    event.confidence_score = Some(Score::new(confidence));
    event.relevance_score = Some(Score::new(relevance));
    event
}

pub fn sourced(mut event: Event, urls: &[&str]) -> Event {
    event.source_list = urls
        .iter()
        .map(|u| SourceRef::new(format!("src {u}"), *u))
        .collect();
    event
}

pub fn make_raw(id: &str, category: &str, summary: &str, timestamp: DateTime<Utc>) -> RawEvent {
    RawEvent {
        id: Some(id.to_string()),
        timestamp: Some(timestamp),
        summary: Some(summary.to_string()),
        category: Some(category.to_string()),
        ..RawEvent::default()
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
