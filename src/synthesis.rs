// src/synthesis.rs
//! Collapses a subgroup into the single record that stands in for it.

use std::collections::HashSet;

use geo::{Centroid, MultiPoint, Point};

use crate::models::{PointRecord, SemanticSubgroup, SubgroupOrigin};

/// Where the representative sits before it is handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// All members coincide; reuse the input coordinate as-is.
    Geographic { lon: f64, lat: f64 },
    /// Centroid in the metric frame, still to be projected back.
    Metric { x: f64, y: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Representative {
    pub name: String,
    pub anchor: Anchor,
    pub sub_category: String,
    pub node_count: usize,
}

/// Sentinels for absent attributes.
#[derive(Debug, Clone, Copy)]
pub struct MissingLabels<'a> {
    pub unnamed: &'a str,
    pub unknown_category: &'a str,
}

/// Most frequent value; ties go to whichever appeared first.
///
/// With all values distinct this is the first one.
pub fn most_frequent<'a>(values: &[&'a str]) -> Option<&'a str> {
    let mut best: Option<(&'a str, usize)> = None;
    for (i, v) in values.iter().enumerate() {
        if values[..i].contains(v) {
            continue;
        }
        let count = values[i..].iter().filter(|other| *other == v).count();
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((*v, count)),
        }
    }
    best.map(|(v, _)| v)
}

/// Shortest value by character count; ties go to whichever appeared first.
pub fn shortest<'a>(values: &[&'a str]) -> Option<&'a str> {
    let mut best: Option<(&'a str, usize)> = None;
    for v in values {
        let len = v.chars().count();
        match best {
            Some((_, best_len)) if best_len <= len => {}
            _ => best = Some((*v, len)),
        }
    }
    best.map(|(v, _)| v)
}

/// Name policy for a subgroup. The two paths differ on purpose:
/// an unsplit cluster takes its most frequent name, a name-split
/// subgroup takes its shortest.
pub fn representative_name<'a>(names: &[&'a str], origin: SubgroupOrigin) -> Option<&'a str> {
    match origin {
        SubgroupOrigin::Spatial => most_frequent(names),
        SubgroupOrigin::Semantic => shortest(names),
    }
}

/// Centroid of the union of member points. Coincident points count once,
/// so this is the mean of the *distinct* locations.
pub fn union_centroid(members: &[usize], coords: &[[f64; 2]]) -> Option<(f64, f64)> {
    let mut seen: HashSet<(u64, u64)> = HashSet::new();
    let distinct: Vec<Point<f64>> = members
        .iter()
        .map(|&i| coords[i])
        .filter(|c| seen.insert((c[0].to_bits(), c[1].to_bits())))
        .map(|c| Point::new(c[0], c[1]))
        .collect();
    MultiPoint::from(distinct).centroid().map(|p| (p.x(), p.y()))
}

/// Builds the representative of one non-empty subgroup.
///
/// `coords` are the metric-frame positions of `records`, index for index.
pub fn synthesize(
    subgroup: &SemanticSubgroup,
    records: &[PointRecord],
    coords: &[[f64; 2]],
    labels: MissingLabels<'_>,
) -> Representative {
    let members = &subgroup.members;
    let names: Vec<&str> = members
        .iter()
        .map(|&i| records[i].name_or(labels.unnamed))
        .collect();
    let name = representative_name(&names, subgroup.origin)
        .unwrap_or(labels.unnamed)
        .to_string();

    let categories: Vec<&str> = members
        .iter()
        .filter_map(|&i| records[i].sub_category.as_deref())
        .collect();
    let sub_category = most_frequent(&categories)
        .unwrap_or(labels.unknown_category)
        .to_string();

    let first = members[0];
    let coincident = members.iter().all(|&i| {
        coords[i][0].to_bits() == coords[first][0].to_bits()
            && coords[i][1].to_bits() == coords[first][1].to_bits()
    });
    let anchor = if coincident {
        Anchor::Geographic {
            lon: records[first].lon,
            lat: records[first].lat,
        }
    } else {
        let (x, y) = union_centroid(members, coords).unwrap_or((coords[first][0], coords[first][1]));
        Anchor::Metric { x, y }
    };

    Representative {
        name,
        anchor,
        sub_category,
        node_count: members.len(),
    }
}
