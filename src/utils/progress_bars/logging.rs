// src/utils/progress_bars/logging.rs - Logging helpers for resolution runs
use log::{debug, info, warn};
use std::time::Instant;

use crate::config::DedupConfig;

#[derive(Clone)]
pub struct ResolutionLogger {
    label: String,
    start_time: Instant,
}

impl ResolutionLogger {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_uppercase(),
            start_time: Instant::now(),
        }
    }

    pub fn log_start(&self, input_count: usize, config: &DedupConfig) {
        info!(
            "[{}] 🚀 Resolving {} points (radius {} m in {}, name threshold {:.2}, semantic split {})",
            self.label,
            input_count,
            config.distance_threshold_m,
            config.metric_crs,
            config.similarity_threshold,
            if config.semantic_clustering { "on" } else { "off" }
        );
    }

    pub fn log_trivial_input(&self, input_count: usize) {
        info!(
            "[{}] ⏭️  {} point(s) - nothing to merge, returning input unchanged",
            self.label, input_count
        );
    }

    pub fn log_phase(&self, phase: &str, details: Option<&str>) {
        let elapsed = self.start_time.elapsed();
        match details {
            Some(details) => info!(
                "[{}] 🔄 Phase: {} - {} [+{:.1}s]",
                self.label,
                phase,
                details,
                elapsed.as_secs_f32()
            ),
            None => info!(
                "[{}] 🔄 Phase: {} [+{:.1}s]",
                self.label,
                phase,
                elapsed.as_secs_f32()
            ),
        }
    }

    pub fn log_cluster(&self, cluster_id: usize, size: usize, subgroups: usize) {
        if size > 1 {
            debug!(
                "[{}] cluster {}: {} points -> {} subgroup(s)",
                self.label, cluster_id, size, subgroups
            );
        }
    }

    pub fn log_completion(
        &self,
        input_count: usize,
        clusters: usize,
        subgroups: usize,
        entities: usize,
    ) {
        let merged = input_count.saturating_sub(entities);
        info!(
            "[{}] ✅ {} raw points → {} spatial clusters → {} subgroups → {} entities ({} merged) in {:.2?}",
            self.label,
            input_count,
            clusters,
            subgroups,
            entities,
            merged,
            self.start_time.elapsed()
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!("[{}] ⚠️  {}", self.label, message);
    }
}
