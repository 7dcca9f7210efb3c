use indexmap::IndexMap;
use serde::Serialize;

use crate::models::{Coord, Tag};

/// A deduplicated way-point.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
    pub coord_key: String,
    pub coord: Coord,
    /// Index of the spot that first produced this coordinate.
    pub source_index: usize,
    pub label: String,
    /// Sequential number for sortie start points; `None` for every other node.
    pub start_label: Option<String>,
    pub tags: Vec<Tag>,
}

impl Node {
    pub fn is_start(&self) -> bool {
        self.start_label.is_some()
    }
}

/// A directed route from an estimated start coordinate to a spot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Route {
    pub id: String,
    pub start: Option<Coord>,
    pub end: Coord,
}

/// Working graph for one map. Both tables iterate in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MapGraph {
    pub nodes: IndexMap<String, Node>,
    pub routes: IndexMap<String, Route>,
}

impl MapGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.routes.is_empty()
    }

    pub fn node_at(&self, coord: &Coord) -> Option<&Node> {
        self.nodes.get(&coord.key())
    }

    pub fn node_at_mut(&mut self, coord: &Coord) -> Option<&mut Node> {
        self.nodes.get_mut(&coord.key())
    }

    pub fn label_at(&self, coord: &Coord) -> Option<&str> {
        self.node_at(coord).map(|n| n.label.as_str())
    }

    /// Ids of routes whose start or end does not land on a node.
    pub fn dangling_routes(&self) -> Vec<&str> {
        self.routes
            .values()
            .filter(|r| {
                let start_ok = r.start.map_or(true, |s| self.nodes.contains_key(&s.key()));
                !start_ok || !self.nodes.contains_key(&r.end.key())
            })
            .map(|r| r.id.as_str())
            .collect()
    }

    /// Appends `tag` to the node at `coord` unless already present. Returns false when
    /// there is no such node.
    pub fn add_tag(&mut self, coord: &Coord, tag: Tag) -> bool {
        match self.node_at_mut(coord) {
            Some(node) => {
                if !node.tags.contains(&tag) {
                    node.tags.push(tag);
                }
                true
            }
            None => false,
        }
    }
}
