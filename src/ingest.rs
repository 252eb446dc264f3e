// src/ingest.rs
//! Turns raw tagged map elements into point records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::PointRecord;
use crate::utils::constants::{POI_CATEGORY_KEYS, TRANSPORT_CATEGORY_KEYS};

/// A map element as fetched upstream: a location plus its free-form tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawElement {
    #[serde(default)]
    pub id: Option<String>,
    pub lon: f64,
    pub lat: f64,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl RawElement {
    pub fn to_record(&self) -> PointRecord {
        PointRecord {
            id: self.id.clone(),
            name: self
                .tags
                .get("name")
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            lon: self.lon,
            lat: self.lat,
            sub_category: sub_category_from_tags(&self.tags),
        }
    }
}

/// Explicit `sub_category` tag, else the first transport or POI key present,
/// lower-cased and trimmed.
pub fn sub_category_from_tags(tags: &BTreeMap<String, String>) -> Option<String> {
    std::iter::once("sub_category")
        .chain(TRANSPORT_CATEGORY_KEYS)
        .chain(POI_CATEGORY_KEYS)
        .filter_map(|key| tags.get(key))
        .map(|value| value.trim().to_lowercase())
        .find(|value| !value.is_empty())
}

pub fn records_from_elements(elements: &[RawElement]) -> Vec<PointRecord> {
    elements.iter().map(RawElement::to_record).collect()
}
