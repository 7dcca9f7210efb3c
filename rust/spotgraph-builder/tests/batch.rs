use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use spotgraph_builder::{aggregate, run_batch, BatchConfig};
use spotgraph_core::{BuildOptions, MapIdent, Procedure};

fn write(path: &Path, v: Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_vec(&v).unwrap()).unwrap();
}

/// 1-1 is well formed, 1-2 references a sprite its sheet lacks, 1-3 has no documents.
fn seed(root: &Path) {
    write(
        &root.join("maps/start2.json"),
        json!({"api_mst_mapinfo": [
            {"api_id": 11, "api_maparea_id": 1, "api_no": 1},
            {"api_id": 12, "api_maparea_id": 1, "api_no": 2},
            {"api_id": 13, "api_maparea_id": 1, "api_no": 3}
        ]}),
    );
    write(
        &root.join("maps/001/01_image.json"),
        json!({"frames": {"map00101_route_1": {"frame": {"x": 0, "y": 0, "w": 20, "h": 20}, "sourceSize": {"w": 20, "h": 20}}}}),
    );
    write(
        &root.join("maps/001/01_info.json"),
        json!({"bg": ["map1-1"], "spots": [
            {"no": 0, "x": 100, "y": 100},
            {"no": 1, "x": 200, "y": 100, "line": {"x": -60, "y": -10}}
        ]}),
    );
    write(&root.join("maps/001/02_image.json"), json!({"frames": {}}));
    write(
        &root.join("maps/001/02_info.json"),
        json!({"spots": [{"no": 1, "x": 0, "y": 0, "line": {"x": 5, "y": 5}}]}),
    );
}

fn config(root: &Path, procedure: Procedure) -> BatchConfig {
    BatchConfig {
        maps_dir: root.join("maps"),
        out_dir: root.join("out"),
        data_dir: root.join("data"),
        procedure,
        options: BuildOptions { jobs: 2, ..BuildOptions::default() },
    }
}

#[tokio::test]
async fn failed_map_does_not_stop_the_others() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());

    let summary = run_batch(config(dir.path(), Procedure::Poi)).await.unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].map, MapIdent::new(1, 2));
    assert!(!summary.is_success());

    let poi: Value = serde_json::from_slice(&fs::read(dir.path().join("out/1/map1-1/poi.json")).unwrap()).unwrap();
    assert_eq!(poi["route"]["1"], json!(["100,100", "200,100"]));
}

#[tokio::test]
async fn sync_without_corpus_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    let err = run_batch(config(dir.path(), Procedure::Sync)).await.unwrap_err();
    assert!(format!("{err:#}").contains("annotation file not found"));
}

#[tokio::test]
async fn missing_map_list_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(run_batch(config(dir.path(), Procedure::Plain)).await.is_err());
}

#[tokio::test]
async fn aggregate_after_genpoi() {
    let dir = tempfile::tempdir().unwrap();
    seed(dir.path());
    run_batch(config(dir.path(), Procedure::Poi)).await.unwrap();

    let (all, latest) = aggregate(&dir.path().join("out"), &dir.path().join("data")).unwrap();
    assert_eq!((all, latest), (1, 1));
    let corpus: Value = serde_json::from_slice(&fs::read(dir.path().join("data/final.json")).unwrap()).unwrap();
    assert!(corpus.get("1-1").is_some());
}
