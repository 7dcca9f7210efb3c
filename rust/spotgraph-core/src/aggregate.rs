//! Cross-map POI corpus built from an output tree.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{GraphError, Result};
use crate::json::{read_json_opt, write_json};
use crate::render::Poi;

pub const FINAL_FILE: &str = "final.json";
pub const FINAL_LATEST_FILE: &str = "final_latest.json";
pub const POI_FILE: &str = "poi.json";

/// `"{world}-{map}"` -> that map's POI table.
pub type PoiCorpus = BTreeMap<String, Poi>;

/// First `{digits}-{digits}` run in a map directory name, e.g. `"7-2"` for `"map7-2"`.
pub fn map_title(dir_name: &str) -> Option<String> {
    let b = dir_name.as_bytes();
    let mut i = 0;
    while i < b.len() {
        if !b[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        if i + 1 < b.len() && b[i] == b'-' && b[i + 1].is_ascii_digit() {
            let mut end = i + 1;
            while end < b.len() && b[end].is_ascii_digit() {
                end += 1;
            }
            return Some(dir_name[start..end].to_string());
        }
    }
    None
}

fn world_of(title: &str) -> Option<u32> {
    title.split_once('-')?.0.parse().ok()
}

fn sorted_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| GraphError::io(dir, e))? {
        let path = entry.map_err(|e| GraphError::io(dir, e))?.path();
        if path.is_dir() {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Walks `out/<world>/<map dir>/poi.json`. Map dirs without a title are skipped, as are
/// titled dirs that have no `poi.json` yet.
pub fn collect_out_dir(out_dir: &Path) -> Result<PoiCorpus> {
    let mut corpus = PoiCorpus::new();
    for world in sorted_dirs(out_dir)? {
        for map_dir in sorted_dirs(&world)? {
            let Some(title) = map_dir.file_name().and_then(|n| n.to_str()).and_then(map_title) else {
                continue;
            };
            let path = map_dir.join(POI_FILE);
            match read_json_opt::<Poi>(&path)? {
                Some(poi) => {
                    corpus.insert(title, poi);
                }
                None => warn!(path = %path.display(), "no poi table, skipping"),
            }
        }
    }
    info!(maps = corpus.len(), "collected poi corpus");
    Ok(corpus)
}

/// Keeps the permanent worlds (below 10) and the most recent one.
pub fn latest_and_permanent(corpus: &PoiCorpus) -> PoiCorpus {
    let Some(max) = corpus.keys().filter_map(|k| world_of(k)).max() else {
        return PoiCorpus::new();
    };
    corpus
        .iter()
        .filter(|(k, _)| world_of(k).is_some_and(|w| w < 10 || w == max))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Writes both corpora into `data_dir`; returns `(all, filtered)` map counts.
pub fn write_aggregates(data_dir: &Path, corpus: &PoiCorpus) -> Result<(usize, usize)> {
    let latest = latest_and_permanent(corpus);
    write_json(&data_dir.join(FINAL_FILE), corpus)?;
    write_json(&data_dir.join(FINAL_LATEST_FILE), &latest)?;
    Ok((corpus.len(), latest.len()))
}
