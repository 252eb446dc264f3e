// src/pipeline.rs
//! Batch driver: resolves several categories of raw elements, one after another,
//! with per-category settings and cross-category overlap removal.

use log::{info, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;
use uuid::Uuid;

use crate::config::settings::Settings;
use crate::config::{ConfigOverrides, DedupConfig};
use crate::ingest::{records_from_elements, RawElement};
use crate::models::{CategorizedEntity, PointRecord};
use crate::resolver::{DuplicateResolver, ResolutionStats};
use crate::utils::progress_bars::progress_config::{
    batch_progress_bar, category_spinner, ProgressConfig,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryFailure {
    pub category: String,
    pub error: String,
}

/// Outcome of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: String,
    pub entities: Vec<CategorizedEntity>,
    pub stats: BTreeMap<String, ResolutionStats>,
    /// Categories with no input left after overlap removal.
    pub skipped: Vec<String>,
    pub failed: Vec<CategoryFailure>,
}

impl BatchReport {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            entities: Vec::new(),
            stats: BTreeMap::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn total_input_records(&self) -> usize {
        self.stats.values().map(|s| s.input_records).sum()
    }
}

/// Drops records whose id appears in `excluded_ids`. Records without an id are kept.
pub fn subtract_overlap(
    records: Vec<PointRecord>,
    excluded_ids: &HashSet<&str>,
) -> (Vec<PointRecord>, usize) {
    let before = records.len();
    let kept: Vec<PointRecord> = records
        .into_iter()
        .filter(|r| match r.id.as_deref() {
            Some(id) => !excluded_ids.contains(id),
            None => true,
        })
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

/// Resolves every category in `inputs`, in the order given.
///
/// Each category's configuration is `base`, then `settings`, then `overrides`
/// (environment and command line). Ids listed in the raw input
/// of a category named by `exclude_overlap_with` are removed first. A category
/// that fails is reported in `failed` and the batch moves on.
pub fn resolve_categories(
    inputs: &[(String, Vec<RawElement>)],
    settings: &Settings,
    base: &DedupConfig,
    overrides: &ConfigOverrides,
    progress: &ProgressConfig,
) -> BatchReport {
    let mut report = BatchReport::new();
    let start = Instant::now();
    info!(
        "Batch {} started: {} categories",
        report.run_id,
        inputs.len()
    );

    let multi_progress = progress.create_multi_progress();
    let batch_pb = multi_progress
        .as_ref()
        .map(|mp| batch_progress_bar(mp, inputs.len() as u64));

    for (category, elements) in inputs {
        if let Some(pb) = &batch_pb {
            pb.set_message(category.clone());
        }

        let records = records_from_elements(elements);
        let excluded_ids: HashSet<&str> = settings
            .exclusions_for(category)
            .iter()
            .filter_map(|other| inputs.iter().find(|(name, _)| name == other))
            .flat_map(|(_, others)| others.iter().filter_map(|e| e.id.as_deref()))
            .collect();
        let (records, removed) = subtract_overlap(records, &excluded_ids);
        if removed > 0 {
            info!(
                "[{}] Removed {} element(s) already present in {:?}",
                category.to_uppercase(),
                removed,
                settings.exclusions_for(category)
            );
        }

        if records.is_empty() {
            info!("[{}] No elements to resolve, skipping", category.to_uppercase());
            report.skipped.push(category.clone());
            if let Some(pb) = &batch_pb {
                pb.inc(1);
            }
            continue;
        }

        let spinner = multi_progress
            .as_ref()
            .filter(|_| progress.should_show_detailed())
            .map(|mp| category_spinner(mp, category));
        let config = overrides.apply(settings.config_for(category, base));
        let outcome = DuplicateResolver::new(config)
            .and_then(|resolver| resolver.resolve_labeled(category, &records));

        match outcome {
            Ok(result) => {
                report
                    .entities
                    .extend(result.entities.into_iter().map(|entity| CategorizedEntity {
                        category: category.clone(),
                        entity,
                    }));
                report.stats.insert(category.clone(), result.stats);
                if let Some(sp) = spinner {
                    sp.finish_with_message(format!(
                        "{}: {} → {}",
                        category, result.stats.input_records, result.stats.resolved_entities
                    ));
                }
            }
            Err(e) => {
                warn!("[{}] Resolution failed: {}", category.to_uppercase(), e);
                report.failed.push(CategoryFailure {
                    category: category.clone(),
                    error: e.to_string(),
                });
                if let Some(sp) = spinner {
                    sp.abandon_with_message(format!("{}: failed", category));
                }
            }
        }

        if let Some(pb) = &batch_pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = batch_pb {
        pb.finish_with_message("done");
    }
    info!(
        "Batch {} finished in {:.2?}: {} entities, {} skipped, {} failed",
        report.run_id,
        start.elapsed(),
        report.entities.len(),
        report.skipped.len(),
        report.failed.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NO_OVERRIDES: ConfigOverrides = ConfigOverrides {
        distance_threshold_m: None,
        metric_crs: None,
        similarity_threshold: None,
        semantic_clustering: None,
        parallel: None,
    };

    const QUIET: ProgressConfig = ProgressConfig {
        enabled: false,
        detailed: false,
    };

    fn element(id: &str, name: &str, dlat_m: f64, station: &str) -> RawElement {
        let mut tags = BTreeMap::new();
        tags.insert("name".to_string(), name.to_string());
        tags.insert("station".to_string(), station.to_string());
        RawElement {
            id: Some(id.to_string()),
            lon: 9.19,
            lat: 45.464 + dlat_m / 111_130.0,
            tags,
        }
    }

    fn sample_inputs() -> Vec<(String, Vec<RawElement>)> {
        vec![
            (
                "metro".to_string(),
                vec![
                    element("n1", "Cadorna", 0.0, "subway"),
                    element("n2", "Cadorna", 20.0, "subway"),
                ],
            ),
            (
                "train".to_string(),
                vec![
                    element("n2", "Cadorna", 20.0, "subway"),
                    element("n3", "Milano Cadorna", 40.0, "train"),
                ],
            ),
        ]
    }

    #[test]
    fn test_categories_resolve_in_order_with_tags() {
        let report = resolve_categories(
            &sample_inputs(),
            &Settings::default(),
            &DedupConfig::default(),
            &NO_OVERRIDES,
            &QUIET,
        );
        assert!(report.failed.is_empty());
        let categories: Vec<_> = report.entities.iter().map(|e| e.category.as_str()).collect();
        assert_eq!(categories, vec!["metro", "train"]);
        assert_eq!(report.entities[0].entity.node_count, 2);
        assert_eq!(report.entities[0].entity.sub_category, "subway");
        assert_eq!(report.total_input_records(), 4);
        assert!(Uuid::parse_str(&report.run_id).is_ok());
    }

    #[test]
    fn test_overlap_with_other_category_is_removed() {
        let settings = Settings::from_yaml(
            r#"
categories:
  train:
    exclude_overlap_with: [metro]
"#,
        )
        .unwrap();
        let report = resolve_categories(
            &sample_inputs(),
            &settings,
            &DedupConfig::default(),
            &NO_OVERRIDES,
            &QUIET,
        );
        let train = report.stats["train"];
        assert_eq!(train.input_records, 1);
        let train_entities: Vec<_> = report
            .entities
            .iter()
            .filter(|e| e.category == "train")
            .collect();
        assert_eq!(train_entities.len(), 1);
        assert_eq!(train_entities[0].entity.name, "Milano Cadorna");
        assert_eq!(train_entities[0].entity.sub_category, "train");
    }

    #[test]
    fn test_overrides_beat_the_settings_file() {
        let settings = Settings::from_yaml(
            r#"
deduplication:
  distance_m: 50
  semantic_clustering: true
categories:
  metro:
    distance_m: 60
"#,
        )
        .unwrap();
        let overrides = ConfigOverrides {
            distance_threshold_m: Some(120.0),
            semantic_clustering: Some(false),
            ..Default::default()
        };
        let config = overrides.apply(settings.config_for("metro", &DedupConfig::default()));
        assert_eq!(config.distance_threshold_m, 120.0);
        assert!(!config.semantic_clustering);

        // "Cadorna" and "Cairoli" 90 m apart: one cluster only under the overridden
        // radius, and kept together only with the name split switched off.
        let inputs = vec![(
            "metro".to_string(),
            vec![
                element("n1", "Cadorna", 0.0, "subway"),
                element("n2", "Cairoli", 90.0, "subway"),
            ],
        )];
        let report =
            resolve_categories(&inputs, &settings, &DedupConfig::default(), &overrides, &QUIET);
        assert_eq!(report.entities.len(), 1);
        assert_eq!(report.entities[0].entity.node_count, 2);

        let without =
            resolve_categories(&inputs, &settings, &DedupConfig::default(), &NO_OVERRIDES, &QUIET);
        assert_eq!(without.entities.len(), 2);
    }

    #[test]
    fn test_empty_category_is_skipped() {
        let mut inputs = sample_inputs();
        inputs.push(("tram".to_string(), Vec::new()));
        let report = resolve_categories(
            &inputs,
            &Settings::default(),
            &DedupConfig::default(),
            &NO_OVERRIDES,
            &QUIET,
        );
        assert_eq!(report.skipped, vec!["tram".to_string()]);
        assert!(!report.stats.contains_key("tram"));
    }

    #[test]
    fn test_failing_category_does_not_stop_the_batch() {
        let settings = Settings::from_yaml(
            r#"
categories:
  metro:
    similarity_threshold: 1.5
"#,
        )
        .unwrap();
        let report = resolve_categories(
            &sample_inputs(),
            &settings,
            &DedupConfig::default(),
            &NO_OVERRIDES,
            &QUIET,
        );
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].category, "metro");
        assert!(report.entities.iter().all(|e| e.category == "train"));
        assert!(!report.entities.is_empty());
    }

    #[test]
    fn test_subtract_overlap_keeps_records_without_ids() {
        let records = vec![
            PointRecord::new(Some("A"), 9.0, 45.0, None).with_id("x"),
            PointRecord::new(Some("B"), 9.0, 45.0, None),
        ];
        let excluded: HashSet<&str> = ["x"].into_iter().collect();
        let (kept, removed) = subtract_overlap(records, &excluded);
        assert_eq!(removed, 1);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name.as_deref(), Some("B"));
    }
}
