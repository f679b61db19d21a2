//! Cluster building: seed-anchored grouping, transitive grouping and id reuse.

mod common;

use common::{at, make_event};
use intelfuse::domain::entities::event::Event;
use intelfuse::domain::ports::link_policy::LinkPolicy;
use intelfuse::domain::services::clustering::{cluster_mapping, ClusterBuilder, ClusterMode};
use intelfuse::domain::services::fusion::FusionEngine;
use intelfuse::domain::services::similarity::SimilarityMatcher;
use intelfuse::domain::values::category::Category;
use intelfuse::domain::values::cluster_id::ClusterId;
use intelfuse::domain::values::score::Score;
use intelfuse::domain::values::source::SourceRef;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Links exactly the listed id pairs, in either direction.
struct PairPolicy(HashSet<(String, String)>);

impl PairPolicy {
    fn new(pairs: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self(
            pairs
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
        ))
    }
}

impl LinkPolicy for PairPolicy {
    fn name(&self) -> &'static str {
        "pairs"
    }

    fn should_link(&self, a: &Event, b: &Event) -> bool {
        self.0.contains(&(a.id.clone(), b.id.clone()))
            || self.0.contains(&(b.id.clone(), a.id.clone()))
    }
}

fn counter_ids() -> impl Fn() -> ClusterId + Send + Sync + 'static {
    let next = AtomicUsize::new(0);
    move || ClusterId::new(format!("c{}", next.fetch_add(1, Ordering::SeqCst)))
}

fn events(ids: &[&str]) -> Vec<Event> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| make_event(id, Category::Protest, "placeholder", at(i as i64)))
        .collect()
}

fn groups(clusters: &[intelfuse::domain::services::clustering::Cluster]) -> Vec<Vec<String>> {
    clusters.iter().map(|c| c.member_ids()).collect()
}

#[test]
fn test_empty_input_gives_no_clusters() {
    let builder = ClusterBuilder::new(PairPolicy::new(&[]), ClusterMode::SeedAnchored);
    assert!(builder.build(&[]).is_empty());
}

#[test]
fn test_every_event_lands_in_exactly_one_cluster() {
    let builder = ClusterBuilder::new(
        PairPolicy::new(&[("a", "c"), ("b", "d")]),
        ClusterMode::SeedAnchored,
    );
    let input = events(&["a", "b", "c", "d", "e"]);
    let clusters = builder.build(&input);

    let mut seen: Vec<String> = clusters.iter().flat_map(|c| c.member_ids()).collect();
    seen.sort();
    assert_eq!(seen, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(
        groups(&clusters),
        vec![vec!["a", "c"], vec!["b", "d"], vec!["e"]]
    );
}

#[test]
fn test_seed_anchored_is_order_dependent() {
    // a~b and b~c, but a and c do not link.
    let policy = PairPolicy::new(&[("a", "b"), ("b", "c")]);
    let builder = ClusterBuilder::new(policy, ClusterMode::SeedAnchored);

    let abc = builder.build(&events(&["a", "b", "c"]));
    assert_eq!(groups(&abc), vec![vec!["a", "b"], vec!["c"]]);

    let bac = builder.build(&events(&["b", "a", "c"]));
    assert_eq!(groups(&bac), vec![vec!["b", "a", "c"]]);
}

#[test]
fn test_seed_anchored_compares_only_with_seed() {
    let policy = PairPolicy::new(&[("a", "b"), ("b", "c")]);
    let builder = ClusterBuilder::new(policy, ClusterMode::SeedAnchored);
    let clusters = builder.build(&events(&["a", "b", "c"]));
    assert!(clusters[1].is_singleton());
}

#[test]
fn test_transitive_merges_chains() {
    let policy = PairPolicy::new(&[("a", "b"), ("b", "c")]);
    let builder = ClusterBuilder::new(policy, ClusterMode::Transitive);

    let abc = builder.build(&events(&["a", "b", "c", "d"]));
    assert_eq!(groups(&abc), vec![vec!["a", "b", "c"], vec!["d"]]);

    let cda = builder.build(&events(&["c", "d", "a", "b"]));
    assert_eq!(groups(&cda), vec![vec!["c", "a", "b"], vec!["d"]]);
}

#[test]
fn test_fresh_ids_come_from_id_source() {
    let builder = ClusterBuilder::new(PairPolicy::new(&[("a", "b")]), ClusterMode::SeedAnchored)
        .with_id_source(counter_ids());
    let clusters = builder.build(&events(&["a", "b", "c"]));
    assert_eq!(clusters[0].id, ClusterId::new("c0"));
    assert_eq!(clusters[1].id, ClusterId::new("c1"));
}

#[test]
fn test_minted_ids_are_unique() {
    let builder = ClusterBuilder::new(PairPolicy::new(&[]), ClusterMode::SeedAnchored);
    let clusters = builder.build(&events(&["a", "b", "c", "d"]));
    let ids: HashSet<&ClusterId> = clusters.iter().map(|c| &c.id).collect();
    assert_eq!(ids.len(), 4);
}

#[test]
fn test_seed_keeps_its_existing_id() {
    let builder = ClusterBuilder::new(PairPolicy::new(&[("a", "b")]), ClusterMode::SeedAnchored)
        .with_id_source(counter_ids());
    let mut input = events(&["a", "b"]);
    input[0].cluster_id = Some(ClusterId::new("prior"));
    let clusters = builder.build(&input);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].id, ClusterId::new("prior"));
}

#[test]
fn test_prior_cluster_members_stay_together() {
    // The policy would link nothing, but a shared id from an earlier run holds.
    let builder = ClusterBuilder::new(PairPolicy::new(&[]), ClusterMode::SeedAnchored);
    let mut input = events(&["a", "b", "c"]);
    input[0].cluster_id = Some(ClusterId::new("k"));
    input[2].cluster_id = Some(ClusterId::new("k"));
    let clusters = builder.build(&input);
    assert_eq!(groups(&clusters), vec![vec!["a", "c"], vec!["b"]]);
    assert_eq!(clusters[0].id, ClusterId::new("k"));
}

#[test]
fn test_reclustering_is_idempotent() {
    let builder = ClusterBuilder::new(
        Arc::new(SimilarityMatcher::default()),
        ClusterMode::SeedAnchored,
    );
    let mut input = vec![
        make_event("a", Category::Protest, "Protest march blocks downtown Berlin streets", at(0)),
        make_event("b", Category::Crime, "Warehouse robbery near the harbor", at(1)),
        make_event("c", Category::Protest, "Protest march blocks downtown Berlin roads", at(2)),
        make_event("d", Category::Crime, "Warehouse robbery near harbor overnight", at(3)),
    ];

    let first = builder.build(&input);
    let first_mapping = cluster_mapping(&first);
    for cluster in &first {
        for member in &cluster.events {
            if let Some(e) = input.iter_mut().find(|e| e.id == member.id) {
                e.cluster_id = Some(cluster.id.clone());
            }
        }
    }

    let second = builder.build(&input);
    assert_eq!(cluster_mapping(&second), first_mapping);
}

#[test]
fn test_mapping_lists_every_cluster() {
    let builder = ClusterBuilder::new(PairPolicy::new(&[("a", "b")]), ClusterMode::SeedAnchored)
        .with_id_source(counter_ids());
    let clusters = builder.build(&events(&["a", "b", "c"]));
    let mapping = cluster_mapping(&clusters);
    assert_eq!(mapping.len(), 2);
    assert_eq!(mapping[&ClusterId::new("c0")], vec!["a", "b"]);
    assert_eq!(mapping[&ClusterId::new("c1")], vec!["c"]);
}

#[test]
fn test_cluster_mode_parse() {
    assert_eq!("transitive".parse::<ClusterMode>().unwrap(), ClusterMode::Transitive);
    assert_eq!(
        "seed_anchored".parse::<ClusterMode>().unwrap(),
        ClusterMode::SeedAnchored
    );
    assert!("bogus".parse::<ClusterMode>().is_err());
    assert_eq!(ClusterMode::default(), ClusterMode::SeedAnchored);
}

// ── End-to-end with the similarity matcher ───────────────────────────────

fn berlin_report(id: &str, category: Category, text: &str, hours: i64, url: &str) -> Event {
    let mut event = make_event(id, category, text, at(hours));
    event.location_name = Some("Berlin".into());
    event.confidence_score = Some(Score::new(0.6));
    event.source_list = vec![SourceRef::new("Wire", url)];
    event
}

#[test]
fn test_berlin_protest_reports_link_cluster_and_fuse() {
    let matcher = Arc::new(SimilarityMatcher::default());
    let a = berlin_report(
        "a",
        Category::Protest,
        "Large protest in Berlin city center",
        0,
        "https://wire.example/1",
    );
    let b = berlin_report(
        "b",
        Category::Protest,
        "Protest Berlin city center thousands",
        1,
        "https://paper.example/2",
    );
    assert!(matcher.should_link(&a, &b));

    let clusters = ClusterBuilder::new(matcher, ClusterMode::SeedAnchored).build(&[a, b]);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].len(), 2);

    let record = FusionEngine::default().fuse_cluster(&clusters[0]).unwrap();
    let mean = 0.6;
    assert!(record.confidence_score.unwrap().value() > mean);
    assert_eq!(record.source_list.len(), 2);
}

#[test]
fn test_protest_and_crime_reports_stay_apart() {
    let matcher = Arc::new(SimilarityMatcher::default());
    let text = "Large protest in Berlin city center";
    let a = berlin_report("a", Category::Protest, text, 0, "https://wire.example/1");
    let b = berlin_report("b", Category::Crime, text, 1, "https://wire.example/1");
    assert!(!matcher.should_link(&a, &b));

    let clusters = ClusterBuilder::new(matcher, ClusterMode::SeedAnchored).build(&[a, b]);
    assert_eq!(clusters.len(), 2);
    assert!(clusters.iter().all(|c| c.is_singleton()));
}

#[test]
fn test_fully_grouped_input_returns_one_cluster_with_its_id() {
    let texts = [
        "Large protest in Berlin city center",
        "Warehouse fire reported near harbor",
        "Flooding closes the northern bridge",
    ];
    for mode in [ClusterMode::SeedAnchored, ClusterMode::Transitive] {
        let mut input: Vec<Event> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| make_event(&format!("e{i}"), Category::Other, t, at(i as i64 * 100)))
            .collect();
        for event in &mut input {
            event.cluster_id = Some(ClusterId::new("k"));
        }

        let builder = ClusterBuilder::new(Arc::new(SimilarityMatcher::default()), mode)
            .with_id_source(counter_ids());
        let clusters = builder.build(&input);
        assert_eq!(clusters.len(), 1, "{mode}");
        assert_eq!(clusters[0].id, ClusterId::new("k"));
        assert_eq!(clusters[0].member_ids(), vec!["e0", "e1", "e2"]);
    }
}
