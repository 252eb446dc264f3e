// src/config/mod.rs

pub mod settings;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::error::{ConfigurationError, DedupResult};
use crate::projection::resolve_metric_frame;
use crate::utils::constants::{
    DEFAULT_DISTANCE_THRESHOLD_M, DEFAULT_METRIC_CRS, DEFAULT_SIMILARITY_THRESHOLD,
    UNKNOWN_CATEGORY_LABEL, UNNAMED_POI_LABEL,
};

/// Settings for one deduplication call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Proximity clustering radius in meters.
    pub distance_threshold_m: f64,
    /// Planar frame used for distances, e.g. "EPSG:32632" for northern Italy.
    pub metric_crs: String,
    /// Sequence-ratio cutoff for name equivalence, in [0, 1].
    pub similarity_threshold: f64,
    /// Split proximity clusters by name before collapsing them.
    pub semantic_clustering: bool,
    /// Name given to points that arrive without one.
    pub unnamed_label: String,
    /// Category given to subgroups none of whose members carry one.
    pub unknown_category: String,
    /// Process clusters on the rayon pool. Output is identical either way.
    pub parallel: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            distance_threshold_m: DEFAULT_DISTANCE_THRESHOLD_M,
            metric_crs: DEFAULT_METRIC_CRS.to_string(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            semantic_clustering: true,
            unnamed_label: UNNAMED_POI_LABEL.to_string(),
            unknown_category: UNKNOWN_CATEGORY_LABEL.to_string(),
            parallel: false,
        }
    }
}

impl DedupConfig {
    pub fn new(distance_threshold_m: f64, metric_crs: &str, similarity_threshold: f64) -> Self {
        Self {
            distance_threshold_m,
            metric_crs: metric_crs.to_string(),
            similarity_threshold,
            ..Default::default()
        }
    }

    pub fn with_semantic_clustering(mut self, enabled: bool) -> Self {
        self.semantic_clustering = enabled;
        self
    }

    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Checks thresholds and that the metric frame resolves.
    pub fn validate(&self) -> DedupResult<()> {
        self.validate_thresholds()?;
        resolve_metric_frame(&self.metric_crs)?;
        Ok(())
    }

    pub fn validate_thresholds(&self) -> DedupResult<()> {
        if !(self.distance_threshold_m.is_finite() && self.distance_threshold_m > 0.0) {
            return Err(ConfigurationError::NonPositiveDistance(self.distance_threshold_m).into());
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigurationError::SimilarityOutOfRange(self.similarity_threshold).into());
        }
        Ok(())
    }

    /// Overrides fields from `DEDUP_*` environment variables.
    ///
    /// Unset variables leave the field alone; unparsable ones are logged and ignored.
    pub fn apply_env_overrides(self) -> Self {
        ConfigOverrides::from_env().apply(self)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().apply_env_overrides()
    }
}

/// Values that beat the settings file: the environment, then the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub distance_threshold_m: Option<f64>,
    pub metric_crs: Option<String>,
    pub similarity_threshold: Option<f64>,
    pub semantic_clustering: Option<bool>,
    pub parallel: Option<bool>,
}

impl ConfigOverrides {
    /// Reads `DEDUP_DISTANCE_M`, `DEDUP_METRIC_CRS`, `DEDUP_SIMILARITY_THRESHOLD`,
    /// `DEDUP_SEMANTIC_CLUSTERING` and `DEDUP_PARALLEL`.
    pub fn from_env() -> Self {
        Self {
            distance_threshold_m: parse_env("DEDUP_DISTANCE_M"),
            metric_crs: env::var("DEDUP_METRIC_CRS")
                .ok()
                .map(|crs| crs.trim().to_string())
                .filter(|crs| !crs.is_empty()),
            similarity_threshold: parse_env("DEDUP_SIMILARITY_THRESHOLD"),
            semantic_clustering: parse_env("DEDUP_SEMANTIC_CLUSTERING"),
            parallel: parse_env("DEDUP_PARALLEL"),
        }
    }

    /// Layers `other` on top; its set fields win.
    pub fn merge(self, other: ConfigOverrides) -> Self {
        Self {
            distance_threshold_m: other.distance_threshold_m.or(self.distance_threshold_m),
            metric_crs: other.metric_crs.or(self.metric_crs),
            similarity_threshold: other.similarity_threshold.or(self.similarity_threshold),
            semantic_clustering: other.semantic_clustering.or(self.semantic_clustering),
            parallel: other.parallel.or(self.parallel),
        }
    }

    pub fn apply(&self, mut config: DedupConfig) -> DedupConfig {
        if let Some(d) = self.distance_threshold_m {
            config.distance_threshold_m = d;
        }
        if let Some(crs) = &self.metric_crs {
            config.metric_crs = crs.clone();
        }
        if let Some(t) = self.similarity_threshold {
            config.similarity_threshold = t;
        }
        if let Some(s) = self.semantic_clustering {
            config.semantic_clustering = s;
        }
        if let Some(p) = self.parallel {
            config.parallel = p;
        }
        debug!("Dedup config after overrides: {:?}", config);
        config
    }
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}
