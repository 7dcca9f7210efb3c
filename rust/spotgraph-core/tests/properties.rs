use std::collections::HashSet;

use indexmap::IndexMap;
use proptest::prelude::*;
use serde_json::{json, Value};

use spotgraph_core::atlas::{Atlas, Sheet};
use spotgraph_core::fit::{fit, FitOptions};
use spotgraph_core::merge::merge_info;
use spotgraph_core::models::{Frame, Rect, Size, Tag};
use spotgraph_core::naming::{alpha_index, alpha_label, AutoNaming, NamingStrategy, SequentialNaming};
use spotgraph_core::{Coord, MapGraph, Node, Route};

fn sheet(prefix: &str, names: &[String], w: i32) -> Sheet {
    let frames: IndexMap<String, Frame> = names
        .iter()
        .map(|n| {
            (
                format!("{prefix}_{n}"),
                Frame { frame: Rect { x: 0, y: 0, w, h: w }, source_size: Size { w, h: w }, ..Frame::default() },
            )
        })
        .collect();
    Sheet::new(prefix, frames)
}

fn graph_from(coords: &[(i32, i32)], routes: &[(usize, Option<(i32, i32)>)]) -> MapGraph {
    let mut g = MapGraph::new();
    for (i, &(x, y)) in coords.iter().enumerate() {
        let c = Coord::new(x, y);
        g.nodes.entry(c.key()).or_insert(Node {
            coord_key: c.key(),
            coord: c,
            source_index: i,
            label: c.key(),
            start_label: None,
            tags: vec![],
        });
    }
    for (id, &(end, start)) in routes.iter().enumerate() {
        let end = coords[end % coords.len()];
        g.routes.insert(
            id.to_string(),
            Route { id: id.to_string(), start: start.map(|(x, y)| Coord::new(x, y)), end: Coord::new(end.0, end.1) },
        );
    }
    g
}

proptest! {
    #[test]
    fn merge_concatenates_arrays_and_prefers_supplement(
        a in prop::collection::vec(any::<i32>(), 0..8),
        b in prop::collection::vec(any::<i32>(), 0..8),
        x in any::<i32>(),
        y in any::<i32>(),
    ) {
        let base = json!({"spots": a, "name": x, "only_base": 1});
        let supp = json!({"spots": b, "name": y});
        let merged = merge_info(&base, &supp);
        let spots = merged["spots"].as_array().unwrap();
        prop_assert_eq!(spots.len(), a.len() + b.len());
        let expected: Vec<Value> = a.iter().chain(b.iter()).map(|v| json!(v)).collect();
        prop_assert_eq!(spots, &expected);
        prop_assert_eq!(&merged["name"], &json!(y));
        prop_assert_eq!(&merged["only_base"], &json!(1));
        // inputs untouched
        prop_assert_eq!(base["spots"].as_array().unwrap().len(), a.len());
    }

    #[test]
    fn atlas_extension_never_changes_existing_resolutions(
        first in prop::collection::vec("[a-z]{1,6}", 1..10),
        second in prop::collection::vec("[a-z]{1,6}", 0..10),
    ) {
        let mut atlas = Atlas::new(sheet("map00101", &first, 10));
        let before: Vec<_> = first.iter().map(|n| atlas.resolve(n, None)).collect();
        atlas.extend(Atlas::new(sheet("map00101", &second, 20)));
        for (n, b) in first.iter().zip(&before) {
            prop_assert_eq!(atlas.resolve(n, None), *b);
            prop_assert_eq!(atlas.resolve(n, None), atlas.resolve(n, None));
        }
        for n in &second {
            prop_assert!(atlas.has(n, None));
        }
    }

    #[test]
    fn fit_is_idempotent_and_leaves_nothing_dangling(
        coords in prop::collection::vec((0i32..300, 0i32..300), 1..30),
        routes in prop::collection::vec((0usize..30, prop::option::of((0i32..300, 0i32..300))), 0..30),
        radius in 0.0f64..12.0,
    ) {
        let mut g = graph_from(&coords, &routes);
        let opts = FitOptions { merge_radius: radius, ..FitOptions::default() };
        fit(&mut g, &opts);
        prop_assert!(g.dangling_routes().is_empty());
        for (i, a) in g.nodes.values().enumerate() {
            for b in g.nodes.values().skip(i + 1) {
                prop_assert!(a.coord.distance(&b.coord) > radius);
            }
        }
        let once = g.clone();
        let again = fit(&mut g, &opts);
        prop_assert!(again.merges.is_empty());
        prop_assert!(again.warnings.is_empty());
        prop_assert_eq!(g, once);
    }

    #[test]
    fn tagging_twice_changes_nothing(tags in prop::collection::vec(0i64..5, 0..12)) {
        let mut g = graph_from(&[(10, 10)], &[]);
        let at = Coord::new(10, 10);
        for t in &tags {
            g.add_tag(&at, Tag::Num(*t));
        }
        let once = g.clone();
        for t in &tags {
            g.add_tag(&at, Tag::Num(*t));
        }
        prop_assert_eq!(&g, &once);
        let unique: HashSet<_> = tags.iter().collect();
        prop_assert_eq!(g.nodes["10,10"].tags.len(), unique.len());
    }

    #[test]
    fn auto_labels_are_unique_within_a_map(starts in prop::collection::vec(any::<bool>(), 1..26)) {
        let mut g = MapGraph::new();
        let mut next_start = 1;
        for (i, is_start) in starts.iter().enumerate() {
            let c = Coord::new(i as i32 * 20, 0);
            let start_label = is_start.then(|| {
                let l = next_start.to_string();
                next_start += 1;
                l
            });
            g.nodes.insert(c.key(), Node {
                coord_key: c.key(),
                coord: c,
                source_index: i + 1,
                label: c.key(),
                start_label,
                tags: vec![],
            });
        }
        let naming = AutoNaming.assign(&g).unwrap();
        let labels: HashSet<&String> = naming.labels.values().collect();
        prop_assert_eq!(labels.len(), g.nodes.len());
    }

    #[test]
    fn autofill_labels_are_unique(n in 1usize..2000) {
        let cells: Vec<String> = (0..n).map(|i| format!("{i},0")).collect();
        let table = SequentialNaming::autofill(&cells);
        let labels: HashSet<&String> = table.values().collect();
        prop_assert_eq!(labels.len(), n);
    }

    #[test]
    fn alpha_labels_invert(i in 0usize..100_000) {
        prop_assert_eq!(alpha_index(&alpha_label(i)), Some(i));
    }
}
