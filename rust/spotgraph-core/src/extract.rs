//! Raw spots to provisional nodes and routes.
//!
//! Route sprite naming convention: a spot with a `line` is reached by a route whose
//! arrow sprite is keyed `"{sheet prefix}_{line.img}"`, or `"{sheet prefix}_route_{no}"`
//! when `line.img` is absent. A spot with a `line` but no matching sprite breaks that
//! convention and aborts the map.

use tracing::{debug, info};

use crate::atlas::Atlas;
use crate::error::{GraphError, Result};
use crate::graph::{MapGraph, Node, Route};
use crate::models::{Coord, MapInfo, Size, Spot, SpotLine};

/// Sprite name (without sheet prefix) of the route arrow leading to `spot`.
pub fn route_sprite_name(spot: &Spot) -> Option<String> {
    let line = spot.line.as_ref()?;
    Some(line.img.clone().unwrap_or_else(|| format!("route_{}", spot.no)))
}

fn half_rounded(v: i32) -> i32 {
    (v as f64 / 2.0 + 0.5).floor() as i32
}

/// Estimates where the route to `spot` starts: the arrow sprite's centre reflected
/// through the spot, i.e. `end + 2 * (centre - end)`.
pub fn project_route_start(spot: &Spot, line: &SpotLine, sprite: Size) -> Coord {
    let cx = spot.x + line.x + half_rounded(sprite.w);
    let cy = spot.y + line.y + half_rounded(sprite.h);
    Coord::new((cx - spot.x) * 2 + spot.x, (cy - spot.y) * 2 + spot.y)
}

pub fn extract(info: &MapInfo, atlas: &Atlas) -> Result<MapGraph> {
    let mut graph = MapGraph::new();
    let mut next_start = 1u32;

    for (index, spot) in info.spots.iter().enumerate() {
        let end = spot.coord();
        let start = match (&spot.line, route_sprite_name(spot)) {
            (Some(line), Some(name)) => {
                let frame = atlas.lookup(&name, None).ok_or_else(|| GraphError::MissingRouteSprite {
                    spot: spot.no.to_string(),
                    sprite: name.clone(),
                })?;
                Some(project_route_start(spot, line, frame.source_size))
            }
            _ => None,
        };

        let id = spot.no.to_string();
        graph.routes.insert(id.clone(), Route { id, start, end });

        let key = end.key();
        if !graph.nodes.contains_key(&key) {
            let start_label = if start.is_none() {
                let l = next_start.to_string();
                next_start += 1;
                Some(l)
            } else {
                None
            };
            graph.nodes.insert(
                key.clone(),
                Node {
                    coord_key: key,
                    coord: end,
                    source_index: index,
                    label: format!("{}_{}_{}", spot.no, spot.x, spot.y),
                    start_label,
                    tags: Vec::new(),
                },
            );
        } else {
            debug!(spot = spot.no, coord = %end, "coordinate already has a node");
        }
    }

    info!(nodes = graph.nodes.len(), routes = graph.routes.len(), "extracted graph");
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::Sheet;
    use crate::models::{Frame, Rect};

    fn atlas(entries: &[(&str, i32, i32)]) -> Atlas {
        let frames = entries
            .iter()
            .map(|(k, w, h)| {
                (
                    k.to_string(),
                    Frame { frame: Rect { x: 0, y: 0, w: *w, h: *h }, source_size: Size { w: *w, h: *h }, ..Frame::default() },
                )
            })
            .collect();
        Atlas::new(Sheet::new("map00101", frames))
    }

    fn spot(no: u32, x: i32, y: i32, line: Option<(i32, i32, Option<&str>)>) -> Spot {
        Spot {
            no,
            x,
            y,
            line: line.map(|(lx, ly, img)| SpotLine { x: lx, y: ly, img: img.map(str::to_string) }),
            color: None,
            direction: None,
        }
    }

    #[test]
    fn projection_reflects_sprite_centre() {
        let s = spot(1, 100, 100, Some((-40, -10, None)));
        let line = s.line.clone().unwrap();
        // centre = (100 - 40 + 10, 100 - 10 + 5) = (70, 95); reflected = (40, 90)
        assert_eq!(project_route_start(&s, &line, Size { w: 20, h: 10 }), Coord::new(40, 90));
        // odd sizes round half up
        assert_eq!(project_route_start(&s, &line, Size { w: 21, h: 11 }), Coord::new(42, 92));
    }

    #[test]
    fn start_nodes_are_numbered_and_duplicates_keep_first() {
        let info = MapInfo {
            spots: vec![
                spot(0, 10, 10, None),
                spot(1, 50, 10, Some((-20, 0, None))),
                spot(2, 50, 10, Some((-20, 0, Some("route_x")))),
                spot(3, 90, 90, None),
            ],
            ..MapInfo::default()
        };
        let g = extract(&info, &atlas(&[("map00101_route_1", 10, 10), ("map00101_route_x", 10, 10)])).unwrap();
        assert_eq!(g.nodes.len(), 3);
        assert_eq!(g.routes.len(), 4);
        assert_eq!(g.nodes["10,10"].start_label.as_deref(), Some("1"));
        assert_eq!(g.nodes["90,90"].start_label.as_deref(), Some("2"));
        let n = &g.nodes["50,10"];
        assert_eq!(n.source_index, 1);
        assert_eq!(n.label, "1_50_10");
        assert!(n.start_label.is_none());
        assert_eq!(g.routes["0"].start, None);
        assert_eq!(g.routes["1"].start, Some(Coord::new(20, 20)));
    }

    #[test]
    fn missing_sprite_aborts() {
        let info = MapInfo { spots: vec![spot(4, 0, 0, Some((1, 1, None)))], ..MapInfo::default() };
        let err = extract(&info, &atlas(&[])).unwrap_err();
        match err {
            GraphError::MissingRouteSprite { spot, sprite } => {
                assert_eq!(spot, "4");
                assert_eq!(sprite, "route_4");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
