// src/resolver.rs
//! Two-stage duplicate resolution: proximity clusters, then name subgroups,
//! each collapsed into one representative entity.

use rayon::prelude::*;
use serde::Serialize;

use crate::clustering::semantic::split_by_seed_name;
use crate::clustering::spatial::{group_spatially, members_by_cluster};
use crate::config::DedupConfig;
use crate::error::DedupResult;
use crate::models::{PointRecord, ResolvedEntity, SemanticSubgroup, SubgroupOrigin};
use crate::projection::{resolve_metric_frame, MetricProjection};
use crate::synthesis::{synthesize, Anchor, MissingLabels, Representative};
use crate::utils::progress_bars::logging::ResolutionLogger;

/// Counts from one resolution call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    pub input_records: usize,
    pub spatial_clusters: usize,
    pub semantic_subgroups: usize,
    pub resolved_entities: usize,
    /// Input records absorbed into another record's entity.
    pub merged_records: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionResult {
    pub entities: Vec<ResolvedEntity>,
    pub stats: ResolutionStats,
}

/// Validated configuration bound to its metric frame.
pub struct DuplicateResolver {
    config: DedupConfig,
    projection: Box<dyn MetricProjection>,
}

impl DuplicateResolver {
    pub fn new(config: DedupConfig) -> DedupResult<Self> {
        config.validate_thresholds()?;
        let projection = resolve_metric_frame(&config.metric_crs)?;
        Ok(Self { config, projection })
    }

    /// Uses a caller-supplied metric frame instead of resolving `config.metric_crs`.
    pub fn with_projection(
        config: DedupConfig,
        projection: Box<dyn MetricProjection>,
    ) -> DedupResult<Self> {
        config.validate_thresholds()?;
        Ok(Self { config, projection })
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    pub fn resolve(&self, records: &[PointRecord]) -> DedupResult<ResolutionResult> {
        self.resolve_labeled("dedup", records)
    }

    /// Resolves one collection of same-class points; `label` only tags log lines.
    pub fn resolve_labeled(
        &self,
        label: &str,
        records: &[PointRecord],
    ) -> DedupResult<ResolutionResult> {
        let logger = ResolutionLogger::new(label);
        let labels = self.missing_labels();

        if records.len() <= 1 {
            logger.log_trivial_input(records.len());
            let entities: Vec<ResolvedEntity> =
                records.iter().map(|r| passthrough(r, labels)).collect();
            let stats = ResolutionStats {
                input_records: records.len(),
                spatial_clusters: records.len(),
                semantic_subgroups: records.len(),
                resolved_entities: entities.len(),
                merged_records: 0,
            };
            return Ok(ResolutionResult { entities, stats });
        }

        logger.log_start(records.len(), &self.config);
        let unnamed = records
            .iter()
            .filter(|r| r.name.is_none())
            .count();
        if unnamed > 0 {
            logger.log_warning(&format!(
                "{} point(s) without a name, treated as '{}'",
                unnamed, self.config.unnamed_label
            ));
        }

        logger.log_phase("Spatial grouping", Some(self.projection.crs()));
        let points = group_spatially(
            records,
            self.projection.as_ref(),
            self.config.distance_threshold_m,
        )?;
        let coords: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        let clusters = members_by_cluster(&points);

        logger.log_phase(
            if self.config.semantic_clustering {
                "Semantic splitting and synthesis"
            } else {
                "Synthesis"
            },
            Some(&format!("{} clusters", clusters.len())),
        );
        let config = &self.config;
        let per_cluster: Vec<Vec<Representative>> = if config.parallel {
            clusters
                .par_iter()
                .enumerate()
                .map(|(id, members)| resolve_cluster(id, members, records, &coords, config, &logger))
                .collect()
        } else {
            clusters
                .iter()
                .enumerate()
                .map(|(id, members)| resolve_cluster(id, members, records, &coords, config, &logger))
                .collect()
        };
        let subgroup_count: usize = per_cluster.iter().map(Vec::len).sum();

        let entities = per_cluster
            .into_iter()
            .flatten()
            .map(|rep| self.to_geographic(rep))
            .collect::<DedupResult<Vec<_>>>()?;

        let stats = ResolutionStats {
            input_records: records.len(),
            spatial_clusters: clusters.len(),
            semantic_subgroups: subgroup_count,
            resolved_entities: entities.len(),
            merged_records: records.len() - entities.len(),
        };
        logger.log_completion(
            stats.input_records,
            stats.spatial_clusters,
            stats.semantic_subgroups,
            stats.resolved_entities,
        );
        Ok(ResolutionResult { entities, stats })
    }

    fn missing_labels(&self) -> MissingLabels<'_> {
        MissingLabels {
            unnamed: &self.config.unnamed_label,
            unknown_category: &self.config.unknown_category,
        }
    }

    fn to_geographic(&self, rep: Representative) -> DedupResult<ResolvedEntity> {
        let (lon, lat) = match rep.anchor {
            Anchor::Geographic { lon, lat } => (lon, lat),
            Anchor::Metric { x, y } => self.projection.inverse(x, y)?,
        };
        Ok(ResolvedEntity {
            name: rep.name,
            lon,
            lat,
            sub_category: rep.sub_category,
            node_count: rep.node_count,
        })
    }
}

/// Resolves `records` under `config` and returns the representative entities.
///
/// Sum of `node_count` over the output always equals `records.len()`.
pub fn resolve_duplicates(
    records: &[PointRecord],
    config: &DedupConfig,
) -> DedupResult<Vec<ResolvedEntity>> {
    let resolver = DuplicateResolver::new(config.clone())?;
    Ok(resolver.resolve(records)?.entities)
}

/// Subgroups of one spatial cluster, in seed order.
pub fn subgroups_for_cluster(
    cluster_id: usize,
    members: &[usize],
    records: &[PointRecord],
    config: &DedupConfig,
) -> Vec<SemanticSubgroup> {
    if !config.semantic_clustering || members.len() == 1 {
        return vec![SemanticSubgroup {
            spatial_cluster_id: cluster_id,
            members: members.to_vec(),
            origin: SubgroupOrigin::Spatial,
        }];
    }

    let names: Vec<&str> = members
        .iter()
        .map(|&i| records[i].name_or(&config.unnamed_label))
        .collect();
    split_by_seed_name(&names, config.similarity_threshold)
        .into_iter()
        .map(|positions| SemanticSubgroup {
            spatial_cluster_id: cluster_id,
            members: positions.into_iter().map(|p| members[p]).collect(),
            origin: SubgroupOrigin::Semantic,
        })
        .collect()
}

fn resolve_cluster(
    cluster_id: usize,
    members: &[usize],
    records: &[PointRecord],
    coords: &[[f64; 2]],
    config: &DedupConfig,
    logger: &ResolutionLogger,
) -> Vec<Representative> {
    let labels = MissingLabels {
        unnamed: &config.unnamed_label,
        unknown_category: &config.unknown_category,
    };
    let subgroups = subgroups_for_cluster(cluster_id, members, records, config);
    logger.log_cluster(cluster_id, members.len(), subgroups.len());
    subgroups
        .iter()
        .map(|subgroup| synthesize(subgroup, records, coords, labels))
        .collect()
}

fn passthrough(record: &PointRecord, labels: MissingLabels<'_>) -> ResolvedEntity {
    ResolvedEntity {
        name: record.name_or(labels.unnamed).to_string(),
        lon: record.lon,
        lat: record.lat,
        sub_category: record
            .sub_category
            .clone()
            .unwrap_or_else(|| labels.unknown_category.to_string()),
        node_count: 1,
    }
}
