use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use spotgraph_core::json::{read_json, write_json};
use spotgraph_core::notation::NOTATION_FILE;
use spotgraph_core::pipeline::{process_map, Layout, Procedure, DIAGRAM_FILE, SPOTS_FILE, UNNAMED_FILE};
use spotgraph_core::{BuildOptions, FsSource, GraphError, MapIdent};

fn frame(w: i32, h: i32) -> Value {
    json!({"frame": {"x": 0, "y": 0, "w": w, "h": h}, "sourceSize": {"w": w, "h": h}})
}

/// Map 1-1: a start at (100,100), a grid spot at (300,100) with a near duplicate at
/// (302,102), and a final spot at (500,300).
fn seed_maps(root: &Path) {
    write_json(
        &root.join("start2.json"),
        &json!({"api_mst_mapinfo": [
            {"api_id": 11, "api_maparea_id": 1, "api_no": 1},
            {"api_id": 12, "api_maparea_id": 1, "api_no": 2}
        ]}),
    )
    .unwrap();
    write_json(
        &root.join("001/01_image.json"),
        &json!({"frames": {
            "map00101_route_1": frame(100, 20),
            "map00101_route_x": frame(100, 20),
            "map00101_route_3": frame(40, 40)
        }}),
    )
    .unwrap();
    write_json(
        &root.join("001/01_info.json"),
        &json!({"bg": ["map1-1"], "spots": [
            {"no": 0, "x": 100, "y": 100},
            {"no": 1, "x": 300, "y": 100, "line": {"x": -150, "y": -10}},
            {"no": 2, "x": 302, "y": 102, "line": {"x": -150, "y": -10, "img": "route_x"}},
            {"no": 3, "x": 500, "y": 300, "line": {"x": -120, "y": -60}}
        ]}),
    )
    .unwrap();
}

fn setup() -> (tempfile::TempDir, FsSource, Layout) {
    let dir = tempfile::tempdir().unwrap();
    let maps = dir.path().join("maps");
    seed_maps(&maps);
    let layout = Layout::new(dir.path().join("out"), dir.path().join("data"));
    (dir, FsSource::new(maps), layout)
}

#[test]
fn genpoi_uses_manual_labels_and_reports_the_rest() {
    let (_dir, source, layout) = setup();
    let ident = MapIdent::new(1, 1);
    let map_dir = layout.map_dir(&ident);
    write_json(&map_dir.join(SPOTS_FILE), &json!({"100,100": "1", "300,100": "A"})).unwrap();

    let outcome = process_map(&source, &ident, Procedure::Poi, &layout, &BuildOptions::default())
        .unwrap()
        .unwrap();
    assert_eq!(outcome.nodes, 3);
    assert_eq!(outcome.routes, 4);
    assert_eq!(outcome.merges, 1);
    assert_eq!(outcome.snap_warnings, 0);
    assert_eq!(outcome.unnamed, 1);

    let poi: Value = read_json(&map_dir.join("poi.json")).unwrap();
    assert_eq!(
        poi,
        json!({
            "route": {"0": [null, "1"], "1": ["1", "A"], "2": ["1", "A"], "3": ["A", "500,300"]},
            "spots": {"1": [100, 100, "start"], "A": [300, 100, ""], "500,300": [500, 300, ""]}
        })
    );
    let unnamed: Value = read_json(&map_dir.join(UNNAMED_FILE)).unwrap();
    assert_eq!(unnamed, json!({"500,300": "500,300"}));
}

#[test]
fn plain_writes_diagram_and_absent_map_is_skipped() {
    let (_dir, source, layout) = setup();
    let opts = BuildOptions::default();
    process_map(&source, &MapIdent::new(1, 1), Procedure::Plain, &layout, &opts).unwrap().unwrap();
    let svg = fs::read_to_string(layout.map_dir(&MapIdent::new(1, 1)).join(DIAGRAM_FILE)).unwrap();
    assert_eq!(svg.matches("<line").count(), 3);
    assert_eq!(svg.matches("<circle").count(), 3);

    assert!(process_map(&source, &MapIdent::new(1, 2), Procedure::Plain, &layout, &opts).unwrap().is_none());
}

#[test]
fn autoname_persists_letters() {
    let (_dir, source, layout) = setup();
    let ident = MapIdent::new(1, 1);
    process_map(&source, &ident, Procedure::Autoname, &layout, &BuildOptions::default()).unwrap();
    let spots: Value = read_json(&layout.map_dir(&ident).join(SPOTS_FILE)).unwrap();
    assert_eq!(spots, json!({"100,100": "1", "300,100": "A", "500,300": "C"}));
}

#[test]
fn sync_copies_corpus_labels_before_naming() {
    let (_dir, source, layout) = setup();
    let ident = MapIdent::new(1, 1);
    write_json(
        &layout.data_dir.join(NOTATION_FILE),
        &json!({"11": {"100,100": "1", "300,100": "B", "500,300": "C"}}),
    )
    .unwrap();
    let outcome = process_map(&source, &ident, Procedure::Sync, &layout, &BuildOptions::default())
        .unwrap()
        .unwrap();
    assert_eq!(outcome.unnamed, 0);
    let poi: Value = read_json(&layout.map_dir(&ident).join("poi.json")).unwrap();
    assert_eq!(poi["route"]["3"], json!(["B", "C"]));
}

#[test]
fn missing_route_sprite_fails_only_that_map() {
    let (dir, source, layout) = setup();
    write_json(&dir.path().join("maps/001/02_image.json"), &json!({"frames": {}})).unwrap();
    write_json(
        &dir.path().join("maps/001/02_info.json"),
        &json!({"spots": [{"no": 1, "x": 0, "y": 0, "line": {"x": 1, "y": 1}}]}),
    )
    .unwrap();
    let err = process_map(&source, &MapIdent::new(1, 2), Procedure::Plain, &layout, &BuildOptions::default())
        .unwrap_err();
    assert!(matches!(err, GraphError::MissingRouteSprite { .. }));
    assert!(!err.is_run_fatal());
}
