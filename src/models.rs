// src/models.rs

use serde::{Deserialize, Serialize};

/// A geotagged map point as it arrives from the upstream fetch.
///
/// Identity is the position in the input collection; `id` is the map
/// element id when the source provides one and is only used to subtract
/// overlapping categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub lon: f64,
    pub lat: f64,
    #[serde(default)]
    pub sub_category: Option<String>,
}

impl PointRecord {
    pub fn new(name: Option<&str>, lon: f64, lat: f64, sub_category: Option<&str>) -> Self {
        Self {
            id: None,
            name: name.map(str::to_string),
            lon,
            lat,
            sub_category: sub_category.map(str::to_string),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Name with the sentinel substituted when absent. An empty name is kept.
    pub fn name_or<'a>(&'a self, unnamed_label: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(unnamed_label)
    }
}

/// A record placed in the metric frame, carrying its proximity cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    /// Position of the source record in the input collection.
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub spatial_cluster_id: usize,
}

/// How a subgroup was produced. Selects the representative-name policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubgroupOrigin {
    /// The whole spatial cluster, never run through name splitting.
    Spatial,
    /// One cell of a name split.
    Semantic,
}

/// Non-empty set of points from one spatial cluster judged to be the same entity.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticSubgroup {
    pub spatial_cluster_id: usize,
    /// Indices into the input collection, in input order.
    pub members: Vec<usize>,
    pub origin: SubgroupOrigin,
}

/// One deduplicated output point, in the geographic reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEntity {
    pub name: String,
    pub lon: f64,
    pub lat: f64,
    pub sub_category: String,
    pub node_count: usize,
}

/// A resolved entity tagged with the category it was resolved under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedEntity {
    pub category: String,
    #[serde(flatten)]
    pub entity: ResolvedEntity,
}
