//! Pairwise linking: geo signals, token overlap and the combined decision.

mod common;

use common::{at, located, make_event, named_place, BERLIN, MUNICH, POTSDAM};
use intelfuse::domain::ports::link_policy::LinkPolicy;
use intelfuse::domain::services::geo::{distance_km, GeoMatcher};
use intelfuse::domain::services::similarity::{MatchConfig, SimilarityMatcher};
use intelfuse::domain::services::text::TextMatcher;
use intelfuse::domain::values::category::Category;

// Token sets used below:
//   STREETS  {protest, march, blocks, downtown, berlin, streets}
//   ROADS    {protest, march, blocks, downtown, berlin, roads}    5/7 = 0.71 vs STREETS
//   GROWS    {protest, march, downtown, berlin, grows}            4/7 = 0.57 vs STREETS
//   HARBOR   {warehouse, fire, reported, near, harbor}            0.0 vs STREETS
const STREETS: &str = "Protest march blocks downtown Berlin streets";
const ROADS: &str = "Protest march blocks downtown Berlin roads";
const GROWS: &str = "Protest march downtown Berlin grows";
const HARBOR: &str = "Warehouse fire reported near harbor";

// ── Geo ──────────────────────────────────────────────────────────────────

#[test]
fn test_distance_berlin_munich() {
    let d = distance_km(BERLIN.0, BERLIN.1, MUNICH.0, MUNICH.1);
    assert!((480.0..=520.0).contains(&d), "got {d}");
}

#[test]
fn test_distance_is_symmetric() {
    let ab = distance_km(BERLIN.0, BERLIN.1, POTSDAM.0, POTSDAM.1);
    let ba = distance_km(POTSDAM.0, POTSDAM.1, BERLIN.0, BERLIN.1);
    assert!((ab - ba).abs() < 1e-9);
    assert!(ab < 50.0);
}

#[test]
fn test_distance_antipodal_is_finite() {
    let d = distance_km(0.0, 0.0, 0.0, 180.0);
    assert!(d.is_finite());
    assert!((d - std::f64::consts::PI * 6371.0).abs() < 1.0);
}

#[test]
fn test_geo_match_by_coordinates() {
    let geo = GeoMatcher::default();
    let a = located(make_event("a", Category::Protest, STREETS, at(0)), BERLIN);
    let b = located(make_event("b", Category::Protest, STREETS, at(0)), POTSDAM);
    let c = located(make_event("c", Category::Protest, STREETS, at(0)), MUNICH);
    assert!(geo.locations_match(&a, &b));
    assert!(!geo.locations_match(&a, &c));
}

#[test]
fn test_geo_radius_is_configurable() {
    let geo = GeoMatcher::new(10.0);
    let a = located(make_event("a", Category::Protest, STREETS, at(0)), BERLIN);
    let b = located(make_event("b", Category::Protest, STREETS, at(0)), POTSDAM);
    assert!(!geo.locations_match(&a, &b));
}

#[test]
fn test_geo_match_by_name_and_entity() {
    let geo = GeoMatcher::default();
    let a = named_place(make_event("a", Category::Protest, STREETS, at(0)), "Berlin, Germany");
    let b = named_place(make_event("b", Category::Protest, STREETS, at(0)), "berlin");
    assert!(geo.locations_match(&a, &b));

    let mut c = make_event("c", Category::Protest, STREETS, at(0));
    c.entity_list.locations = vec!["Kreuzberg".into()];
    let mut d = make_event("d", Category::Protest, STREETS, at(0));
    d.entity_list.locations = vec!["kreuzberg".into(), "Berlin".into()];
    assert!(geo.locations_match(&c, &d));
}

#[test]
fn test_no_geographic_information_never_matches() {
    let geo = GeoMatcher::default();
    let a = make_event("a", Category::Protest, STREETS, at(0));
    let b = make_event("b", Category::Protest, STREETS, at(0));
    assert!(!geo.locations_match(&a, &b));
}

// ── Text ─────────────────────────────────────────────────────────────────

#[test]
fn test_text_similarity_bounds() {
    let text = TextMatcher::new();
    assert_eq!(text.similarity(STREETS, STREETS), 1.0);
    assert_eq!(text.similarity(STREETS, HARBOR), 0.0);
    assert_eq!(text.similarity("", STREETS), 0.0);
    assert_eq!(text.similarity("", ""), 0.0);

    let s = text.similarity(STREETS, ROADS);
    assert!((s - 5.0 / 7.0).abs() < 1e-9);
    assert_eq!(s, text.similarity(ROADS, STREETS));
}

#[test]
fn test_text_similarity_ignores_case_and_punctuation() {
    let text = TextMatcher::new();
    assert_eq!(
        text.similarity("PROTEST, march; Berlin!", "protest march berlin"),
        1.0
    );
}

// ── Combined decision ────────────────────────────────────────────────────

#[test]
fn test_strong_text_links_without_location() {
    let m = SimilarityMatcher::default();
    let a = make_event("a", Category::Protest, STREETS, at(0));
    let b = make_event("b", Category::Protest, ROADS, at(2));
    let decision = m.evaluate(&a, &b);
    assert_eq!(decision.geo_match, Some(false));
    assert!(decision.linked);
}

#[test]
fn test_moderate_text_needs_location() {
    let m = SimilarityMatcher::default();

    let a = make_event("a", Category::Protest, STREETS, at(0));
    let b = make_event("b", Category::Protest, GROWS, at(1));
    assert!(!m.should_link(&a, &b));

    let a = located(a, BERLIN);
    let b = located(b, POTSDAM);
    assert!(m.should_link(&a, &b));

    let far = located(make_event("c", Category::Protest, GROWS, at(1)), MUNICH);
    assert!(!m.should_link(&a, &far));
}

#[test]
fn test_location_alone_is_not_enough() {
    let m = SimilarityMatcher::default();
    let a = located(make_event("a", Category::Protest, STREETS, at(0)), BERLIN);
    let b = located(make_event("b", Category::Protest, HARBOR, at(0)), BERLIN);
    assert!(!m.should_link(&a, &b));
}

#[test]
fn test_category_gate() {
    let m = SimilarityMatcher::default();
    let a = located(make_event("a", Category::Protest, STREETS, at(0)), BERLIN);
    let b = located(make_event("b", Category::Crime, STREETS, at(0)), BERLIN);
    let decision = m.evaluate(&a, &b);
    assert!(!decision.same_category);
    assert_eq!(decision.text_similarity, None);
    assert!(!decision.linked);
}

#[test]
fn test_time_gate_is_inclusive() {
    let m = SimilarityMatcher::default();
    let a = make_event("a", Category::Protest, STREETS, at(0));
    let edge = make_event("b", Category::Protest, STREETS, at(24));
    let past = make_event("c", Category::Protest, STREETS, at(25));
    assert!(m.should_link(&a, &edge));
    assert!(!m.should_link(&a, &past));
    assert!(!m.evaluate(&a, &past).within_window);
}

#[test]
fn test_custom_thresholds() {
    let m = SimilarityMatcher::new(MatchConfig {
        time_window_hours: 2,
        text_threshold_alone: 0.5,
        ..MatchConfig::default()
    });
    let a = make_event("a", Category::Protest, STREETS, at(0));
    let b = make_event("b", Category::Protest, GROWS, at(1));
    let c = make_event("c", Category::Protest, STREETS, at(3));
    assert!(m.should_link(&a, &b));
    assert!(!m.should_link(&a, &c));
}

#[test]
fn test_decision_is_symmetric() {
    let m = SimilarityMatcher::default();
    let events = vec![
        located(make_event("a", Category::Protest, STREETS, at(0)), BERLIN),
        located(make_event("b", Category::Protest, GROWS, at(3)), POTSDAM),
        make_event("c", Category::Protest, ROADS, at(20)),
        located(make_event("d", Category::Protest, HARBOR, at(1)), MUNICH),
        make_event("e", Category::Crime, STREETS, at(0)),
    ];
    for a in &events {
        for b in &events {
            assert_eq!(m.should_link(a, b), m.should_link(b, a), "{} vs {}", a.id, b.id);
        }
    }
}

#[test]
fn test_full_text_is_compared_when_present() {
    let m = SimilarityMatcher::default();
    let mut a = make_event("a", Category::Protest, "Short note", at(0));
    a.full_text = Some(STREETS.into());
    let mut b = make_event("b", Category::Protest, "Different headline", at(0));
    b.full_text = Some(ROADS.into());
    assert!(m.should_link(&a, &b));
}

#[test]
fn test_window_wider_than_calendar_links_instead_of_failing() {
    let m = SimilarityMatcher::new(MatchConfig {
        time_window_hours: i64::MAX / 1000,
        ..MatchConfig::default()
    });
    let a = make_event("a", Category::Protest, STREETS, at(0));
    let b = make_event("b", Category::Protest, ROADS, at(24 * 400));
    assert!(m.evaluate(&a, &b).within_window);
    assert!(m.should_link(&a, &b));
}
