//! Node/route reconciliation.
//!
//! Pass A merges nodes whose coordinates lie within `merge_radius` of each other
//! (single linkage, so clusters are transitive). The canonical member is the first one
//! on the 10px grid, else the first one; routes touching a discarded member are
//! re-pointed to it. Grouping uses coordinates only, never labels.
//!
//! Pass B snaps every route start to its nearest node. A snap whose nearest distance is
//! not below `tolerance` times some other node's distance is reported, but the snap
//! still happens.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

use crate::config::{BuildOptions, DEFAULT_MERGE_RADIUS, FIT_TOLERANCE};
use crate::graph::MapGraph;
use crate::models::Coord;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitOptions {
    pub merge_radius: f64,
    pub tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self { merge_radius: DEFAULT_MERGE_RADIUS, tolerance: FIT_TOLERANCE }
    }
}

impl From<&BuildOptions> for FitOptions {
    fn from(o: &BuildOptions) -> Self {
        Self { merge_radius: o.merge_radius, tolerance: o.fit_tolerance }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MergeRecord {
    pub canonical: String,
    pub merged: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SnapWarning {
    pub route: String,
    pub nearest: String,
    pub nearest_distance: f64,
    pub contender: String,
    pub contender_distance: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FitReport {
    pub merges: Vec<MergeRecord>,
    pub warnings: Vec<SnapWarning>,
}

pub fn fit(graph: &mut MapGraph, opts: &FitOptions) -> FitReport {
    let merges = merge_nodes(graph, opts.merge_radius);
    let warnings = snap_route_starts(graph, opts.tolerance);
    FitReport { merges, warnings }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Pass A. Returns one record per cluster that had more than one member.
pub fn merge_nodes(graph: &mut MapGraph, radius: f64) -> Vec<MergeRecord> {
    let keys: Vec<String> = graph.nodes.keys().cloned().collect();
    let coords: Vec<Coord> = graph.nodes.values().map(|n| n.coord).collect();
    let n = coords.len();

    let mut parent: Vec<usize> = (0..n).collect();
    for i in 0..n {
        for j in (i + 1)..n {
            if coords[i].distance(&coords[j]) <= radius {
                let (a, b) = (find(&mut parent, i), find(&mut parent, j));
                if a != b {
                    // smaller index stays root so clusters iterate in document order
                    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
                    parent[hi] = lo;
                }
            }
        }
    }

    let mut clusters: IndexMap<usize, Vec<usize>> = IndexMap::new();
    for i in 0..n {
        let root = find(&mut parent, i);
        clusters.entry(root).or_default().push(i);
    }

    let mut records = Vec::new();
    for members in clusters.values().filter(|m| m.len() > 1) {
        let canonical = members.iter().copied().find(|&i| coords[i].on_grid()).unwrap_or(members[0]);
        let target = coords[canonical];
        let mut merged = Vec::with_capacity(members.len() - 1);

        for &m in members.iter().filter(|&&m| m != canonical) {
            let Some(gone) = graph.nodes.shift_remove(&keys[m]) else { continue };
            if let Some(keep) = graph.nodes.get_mut(&keys[canonical]) {
                if keep.start_label.is_none() {
                    keep.start_label = gone.start_label;
                }
                for t in gone.tags {
                    if !keep.tags.contains(&t) {
                        keep.tags.push(t);
                    }
                }
            }
            for route in graph.routes.values_mut() {
                if route.start == Some(gone.coord) {
                    route.start = Some(target);
                }
                if route.end == gone.coord {
                    route.end = target;
                }
            }
            merged.push(keys[m].clone());
        }

        warn!(canonical = %keys[canonical], merged = ?merged, "merging spots");
        records.push(MergeRecord { canonical: keys[canonical].clone(), merged });
    }
    records
}

/// Pass B. Every route start ends up on a node coordinate.
pub fn snap_route_starts(graph: &mut MapGraph, tolerance: f64) -> Vec<SnapWarning> {
    let nodes: Vec<(String, Coord)> = graph.nodes.values().map(|n| (n.coord_key.clone(), n.coord)).collect();
    if nodes.is_empty() {
        return Vec::new();
    }

    let mut warnings = Vec::new();
    for route in graph.routes.values_mut() {
        let Some(start) = route.start else { continue };
        let distances: Vec<f64> = nodes.iter().map(|(_, c)| c.distance(&start)).collect();
        let mut nearest = 0;
        for (i, d) in distances.iter().enumerate() {
            if *d < distances[nearest] {
                nearest = i;
            }
        }
        let min = distances[nearest];

        for (i, d) in distances.iter().enumerate() {
            if i == nearest || min <= d * tolerance {
                continue;
            }
            warn!(
                route = %route.id,
                nearest = %nodes[nearest].0,
                min = format_args!("{:.2}", min),
                contender = %nodes[i].0,
                distance = format_args!("{:.2}", d),
                "fit route over tolerance"
            );
            warnings.push(SnapWarning {
                route: route.id.clone(),
                nearest: nodes[nearest].0.clone(),
                nearest_distance: min,
                contender: nodes[i].0.clone(),
                contender_distance: *d,
            });
        }
        route.start = Some(nodes[nearest].1);
    }
    warnings
}
