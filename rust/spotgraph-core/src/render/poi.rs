use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::graph::MapGraph;
use crate::models::Coord;

pub const START_KIND: &str = "start";

/// Point-of-interest table of one map (`poi.json`).
///
/// `route` maps a route id to `[start label | null, end label]`; `spots` maps a label
/// to `[x, y, kind]` where kind is `"start"` or `""`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub route: IndexMap<String, (Option<String>, String)>,
    pub spots: IndexMap<String, (i32, i32, String)>,
}

impl Poi {
    /// Fails when a route endpoint has no node, i.e. the graph was not fitted.
    pub fn from_graph(graph: &MapGraph) -> Result<Self> {
        let label = |route: &str, c: &Coord| -> Result<String> {
            graph
                .label_at(c)
                .map(str::to_string)
                .ok_or_else(|| GraphError::DanglingRoute { route: route.to_string(), coord_key: c.key() })
        };

        let mut poi = Poi::default();
        for (id, r) in &graph.routes {
            let start = r.start.as_ref().map(|s| label(id, s)).transpose()?;
            poi.route.insert(id.clone(), (start, label(id, &r.end)?));
        }
        for node in graph.nodes.values() {
            let kind = if node.is_start() { START_KIND } else { "" };
            poi.spots.insert(node.label.clone(), (node.coord.x, node.coord.y, kind.to_string()));
        }
        Ok(poi)
    }
}
