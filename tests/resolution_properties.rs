use geodedupe_lib::clustering::semantic::split_by_seed_name;
use geodedupe_lib::clustering::spatial::connected_within;
use geodedupe_lib::matching::name::{names_equivalent, sequence_ratio};
use geodedupe_lib::{resolve_duplicates, DedupConfig, PointRecord};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const NAMES: &[&str] = &[
    "Duomo",
    "Duomo M1",
    "Duomo M3",
    "Cordusio",
    "Cairoli",
    "Cairoli Castello",
    "Cadorna",
    "Cadorna FN",
    "Missori",
];

const CATEGORIES: &[&str] = &["subway", "tram", "bus_stop"];

fn record_strategy() -> impl Strategy<Value = PointRecord> {
    (
        prop::option::of(prop::sample::select(NAMES)),
        0.0f64..400.0,
        0.0f64..400.0,
        prop::option::of(prop::sample::select(CATEGORIES)),
    )
        .prop_map(|(name, north_m, east_m, category)| {
            PointRecord::new(
                name,
                9.19 + east_m / 78_000.0,
                45.464 + north_m / 111_130.0,
                category,
            )
        })
}

fn config(semantic: bool) -> DedupConfig {
    DedupConfig::new(50.0, "EPSG:32632", 0.8).with_semantic_clustering(semantic)
}

proptest! {
    #[test]
    fn node_counts_partition_the_input(
        records in prop::collection::vec(record_strategy(), 0..40),
        semantic in any::<bool>(),
    ) {
        let entities = resolve_duplicates(&records, &config(semantic)).unwrap();
        let total: usize = entities.iter().map(|e| e.node_count).sum();
        prop_assert_eq!(total, records.len());
        prop_assert!(entities.iter().all(|e| e.node_count >= 1));
        prop_assert!(entities.iter().all(|e| !e.name.is_empty() && !e.sub_category.is_empty()));
    }

    #[test]
    fn resolution_is_deterministic(records in prop::collection::vec(record_strategy(), 0..40)) {
        let first = resolve_duplicates(&records, &config(true)).unwrap();
        let second = resolve_duplicates(&records, &config(true).with_parallel(true)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn name_split_never_merges_more(records in prop::collection::vec(record_strategy(), 0..40)) {
        let split = resolve_duplicates(&records, &config(true)).unwrap();
        let unsplit = resolve_duplicates(&records, &config(false)).unwrap();
        prop_assert!(split.len() >= unsplit.len());
    }

    #[test]
    fn proximity_labels_respect_the_radius(
        coords in prop::collection::vec((0.0f64..500.0, 0.0f64..500.0), 1..60),
        radius in 1.0f64..80.0,
    ) {
        let coords: Vec<[f64; 2]> = coords.into_iter().map(|(x, y)| [x, y]).collect();
        let labels = connected_within(&coords, radius);
        let dist = |a: [f64; 2], b: [f64; 2]| ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt();

        for i in 0..coords.len() {
            let mut has_neighbor = false;
            for j in 0..coords.len() {
                if i == j {
                    continue;
                }
                if dist(coords[i], coords[j]) <= radius {
                    prop_assert_eq!(labels[i], labels[j]);
                }
                if labels[i] == labels[j] && dist(coords[i], coords[j]) <= radius {
                    has_neighbor = true;
                }
            }
            let cluster_size = labels.iter().filter(|&&l| l == labels[i]).count();
            prop_assert!(cluster_size == 1 || has_neighbor);
        }
    }

    #[test]
    fn seed_split_covers_every_position_once(
        names in prop::collection::vec(prop::sample::select(NAMES), 0..25),
        threshold in 0.0f64..=1.0,
    ) {
        let groups = split_by_seed_name(&names, threshold);
        let mut seen: Vec<usize> = groups.iter().flatten().copied().collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..names.len()).collect::<Vec<_>>());

        for group in &groups {
            let seed = group[0];
            prop_assert!(group.windows(2).all(|w| w[0] < w[1]));
            for &member in &group[1..] {
                prop_assert!(names_equivalent(
                    &names[seed].to_lowercase(),
                    &names[member].to_lowercase(),
                    threshold
                ));
            }
        }
    }

    #[test]
    fn ratio_stays_in_unit_interval(a in "[a-z ]{0,30}", b in "[a-z ]{0,30}") {
        let ratio = sequence_ratio(&a, &b);
        prop_assert!((0.0..=1.0).contains(&ratio));
        if !a.is_empty() {
            prop_assert_eq!(sequence_ratio(&a, &a), 1.0);
        }
    }
}

#[test]
fn containment_merges_even_at_threshold_one() {
    let records = vec![
        PointRecord::new(Some("Duomo"), 9.19, 45.464, Some("subway")),
        PointRecord::new(Some("Duomo Station"), 9.19, 45.46405, Some("subway")),
    ];
    let config = DedupConfig::new(50.0, "EPSG:32632", 1.0);
    let entities = resolve_duplicates(&records, &config).unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].name, "Duomo");
    assert_eq!(entities[0].node_count, 2);
}

#[test]
fn single_record_comes_back_unchanged() {
    let record = PointRecord::new(Some("Lanza"), 9.1812345, 45.4712345, Some("subway"));
    let entities = resolve_duplicates(std::slice::from_ref(&record), &config(true)).unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0].lon, record.lon);
    assert_eq!(entities[0].lat, record.lat);
    assert_eq!(entities[0].name, "Lanza");
    assert_eq!(entities[0].sub_category, "subway");
}

#[test]
fn points_spaced_beyond_the_radius_stay_separate() {
    // 80 m apart along a meridian with a 50 m radius
    let records: Vec<PointRecord> = (0..5)
        .map(|i| PointRecord::new(Some("Duomo"), 9.19, 45.464 + (i as f64 * 80.0) / 111_130.0, None))
        .collect();
    let entities = resolve_duplicates(&records, &config(true)).unwrap();
    assert_eq!(entities.len(), 5);
}

#[test]
fn seed_comparison_is_not_transitive() {
    // "garibaldi fs" joins seed "garibaldi"; "fs" is contained in "garibaldi fs"
    // but is never compared with it.
    let groups = split_by_seed_name(&["Garibaldi", "Garibaldi FS", "FS"], 0.9);
    assert_eq!(groups, vec![vec![0, 1], vec![2]]);
}
