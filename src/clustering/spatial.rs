// src/clustering/spatial.rs
//! Proximity clusters: points chained together by hops of at most the
//! configured radius. With a minimum cluster size of one nothing is noise,
//! every isolated point is its own cluster.

use log::debug;
use petgraph::unionfind::UnionFind;
use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::error::DedupResult;
use crate::models::{PointRecord, ProjectedPoint};
use crate::projection::MetricProjection;

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Moves every record into the metric frame, keeping input order.
pub fn project_records(
    records: &[PointRecord],
    projection: &dyn MetricProjection,
) -> DedupResult<Vec<[f64; 2]>> {
    records
        .iter()
        .map(|r| projection.forward(r.lon, r.lat).map(|(x, y)| [x, y]))
        .collect()
}

/// Connected components of the "within `radius` of each other" relation.
///
/// Returns one label per coordinate. Labels are dense and numbered in
/// order of each component's first member, so the labelling only depends
/// on input order, never on index internals.
pub fn connected_within(coords: &[[f64; 2]], radius: f64) -> Vec<usize> {
    let n = coords.len();
    if n == 0 {
        return Vec::new();
    }

    let tree: RTree<IndexedPoint> = RTree::bulk_load(
        coords
            .iter()
            .enumerate()
            .map(|(i, c)| IndexedPoint::new(*c, i))
            .collect(),
    );

    let radius_sq = radius * radius;
    let mut components: UnionFind<usize> = UnionFind::new(n);
    for (i, c) in coords.iter().enumerate() {
        for neighbor in tree.locate_within_distance(*c, radius_sq) {
            if neighbor.data != i {
                components.union(i, neighbor.data);
            }
        }
    }

    let roots = components.into_labeling();
    let mut dense_labels: Vec<Option<usize>> = vec![None; n];
    let mut next_label = 0;
    roots
        .iter()
        .map(|&root| {
            *dense_labels[root].get_or_insert_with(|| {
                let label = next_label;
                next_label += 1;
                label
            })
        })
        .collect()
}

/// Projects records and assigns each one a spatial cluster id.
pub fn group_spatially(
    records: &[PointRecord],
    projection: &dyn MetricProjection,
    distance_threshold_m: f64,
) -> DedupResult<Vec<ProjectedPoint>> {
    let coords = project_records(records, projection)?;
    let labels = connected_within(&coords, distance_threshold_m);

    let points: Vec<ProjectedPoint> = coords
        .iter()
        .zip(labels)
        .enumerate()
        .map(|(index, (c, spatial_cluster_id))| ProjectedPoint {
            index,
            x: c[0],
            y: c[1],
            spatial_cluster_id,
        })
        .collect();

    debug!(
        "Spatial grouping: {} points -> {} clusters within {} m in {}",
        points.len(),
        cluster_count(&points),
        distance_threshold_m,
        projection.crs()
    );
    Ok(points)
}

pub fn cluster_count(points: &[ProjectedPoint]) -> usize {
    points
        .iter()
        .map(|p| p.spatial_cluster_id + 1)
        .max()
        .unwrap_or(0)
}

/// Members of each cluster in input order, clusters ordered by id.
pub fn members_by_cluster(points: &[ProjectedPoint]) -> Vec<Vec<usize>> {
    let mut clusters: Vec<Vec<usize>> = vec![Vec::new(); cluster_count(points)];
    for p in points {
        clusters[p.spatial_cluster_id].push(p.index);
    }
    clusters
}
