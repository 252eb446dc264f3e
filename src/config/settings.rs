// src/config/settings.rs
//! Project settings file: one metric frame for the target region, shared
//! deduplication defaults, and per-category overrides.
//!
//! ```yaml
//! crs:
//!   metric: "EPSG:32632"
//! deduplication:
//!   distance_m: 50
//!   similarity_threshold: 0.8
//!   semantic_clustering: true
//! categories:
//!   metro:
//!     distance_m: 150
//!   train:
//!     distance_m: 300
//!     exclude_overlap_with: [metro]
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::DedupConfig;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CrsSettings {
    pub metric: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeduplicationSettings {
    pub distance_m: Option<f64>,
    pub similarity_threshold: Option<f64>,
    pub semantic_clustering: Option<bool>,
    pub parallel: Option<bool>,
    pub unnamed_label: Option<String>,
    pub unknown_category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CategorySettings {
    pub distance_m: Option<f64>,
    pub similarity_threshold: Option<f64>,
    pub semantic_clustering: Option<bool>,
    /// Categories whose element ids are removed from this one before resolving.
    pub exclude_overlap_with: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub crs: CrsSettings,
    pub deduplication: DeduplicationSettings,
    pub categories: BTreeMap<String, CategorySettings>,
}

impl Settings {
    /// Loads settings from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            bail!("Config file not found at: {}", path.display());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).context("Failed to parse settings YAML")
    }

    /// Shared defaults layered over `base`.
    pub fn base_config(&self, base: &DedupConfig) -> DedupConfig {
        let mut config = base.clone();
        let dedup = &self.deduplication;
        if let Some(crs) = &self.crs.metric {
            config.metric_crs = crs.clone();
        }
        if let Some(d) = dedup.distance_m {
            config.distance_threshold_m = d;
        }
        if let Some(t) = dedup.similarity_threshold {
            config.similarity_threshold = t;
        }
        if let Some(s) = dedup.semantic_clustering {
            config.semantic_clustering = s;
        }
        if let Some(p) = dedup.parallel {
            config.parallel = p;
        }
        if let Some(label) = &dedup.unnamed_label {
            config.unnamed_label = label.clone();
        }
        if let Some(label) = &dedup.unknown_category {
            config.unknown_category = label.clone();
        }
        config
    }

    /// Configuration for one category: shared defaults, then its overrides.
    pub fn config_for(&self, category: &str, base: &DedupConfig) -> DedupConfig {
        let mut config = self.base_config(base);
        if let Some(overrides) = self.categories.get(category) {
            if let Some(d) = overrides.distance_m {
                config.distance_threshold_m = d;
            }
            if let Some(t) = overrides.similarity_threshold {
                config.similarity_threshold = t;
            }
            if let Some(s) = overrides.semantic_clustering {
                config.semantic_clustering = s;
            }
        }
        config
    }

    pub fn exclusions_for(&self, category: &str) -> &[String] {
        self.categories
            .get(category)
            .map(|c| c.exclude_overlap_with.as_slice())
            .unwrap_or(&[])
    }
}
