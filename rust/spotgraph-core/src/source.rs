//! Access to raw per-map documents and secret page discovery.
//!
//! Raw documents live at `{area:03}/{no:02}_image{page}.json` and
//! `{area:03}/{no:02}_info{page}.json`. The base page has an empty suffix. Maps in areas
//! above the secret threshold may carry extra pages whose suffix is the running count of
//! spots consumed so far; the first page that is absent ends the chain.

use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, info};

use crate::atlas::Atlas;
use crate::error::{GraphError, Result};
use crate::json::read_json_opt;
use crate::merge::merge_info;
use crate::models::{AtlasDocument, ConstantsDocument, MapIdent, MapInfo};

pub const CONSTANTS_FILE: &str = "start2.json";

pub trait MapSource: Send + Sync {
    /// Fetches a document by relative path. `Ok(None)` means the resource is absent.
    fn fetch(&self, rel: &str) -> Result<Option<Value>>;
}

/// Documents on the local filesystem under `root`.
#[derive(Clone, Debug)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Reads the map list. Its absence is an operator error, not a missing map.
    pub fn constants(&self) -> Result<ConstantsDocument> {
        let path = self.root.join(CONSTANTS_FILE);
        read_json_opt(&path)?
            .ok_or_else(|| GraphError::Config(format!("constants document not found: {}", path.display())))
    }
}

impl MapSource for FsSource {
    fn fetch(&self, rel: &str) -> Result<Option<Value>> {
        read_json_opt(&self.root.join(rel))
    }
}

pub fn image_path(ident: &MapIdent, page: &str) -> String {
    format!("{}/{}_image{}.json", ident.area_dir(), ident.file_stem(), page)
}

pub fn info_path(ident: &MapIdent, page: &str) -> String {
    format!("{}/{}_info{}.json", ident.area_dir(), ident.file_stem(), page)
}

/// Everything the extractor needs for one map: base and secret pages folded together.
#[derive(Clone, Debug)]
pub struct MapBundle {
    pub ident: MapIdent,
    pub atlas: Atlas,
    pub info: MapInfo,
    /// Suffix numbers of the secret pages that were found.
    pub pages: Vec<usize>,
}

impl MapBundle {
    /// Unique spot coordinate keys in document order.
    pub fn cells(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.info.spots.iter().map(|s| s.coord().key()).filter(|k| seen.insert(k.clone())).collect()
    }
}

fn decode_atlas(ident: &MapIdent, rel: &str, v: Value) -> Result<Atlas> {
    let doc: AtlasDocument = serde_json::from_value(v)
        .map_err(|e| GraphError::InvalidDocument { path: rel.to_string(), message: e.to_string() })?;
    Ok(Atlas::from_document(doc, ident.sprite_prefix()))
}

fn spot_count(info: &Value) -> usize {
    info.get("spots").and_then(Value::as_array).map_or(0, Vec::len)
}

fn fetch_page(source: &dyn MapSource, ident: &MapIdent, page: &str) -> Result<Option<(Atlas, Value)>> {
    let image_rel = image_path(ident, page);
    let Some(image) = source.fetch(&image_rel)? else { return Ok(None) };
    let Some(info) = source.fetch(&info_path(ident, page))? else { return Ok(None) };
    Ok(Some((decode_atlas(ident, &image_rel, image)?, info)))
}

/// Loads a map and any secret pages. `Ok(None)` when the base documents are absent.
pub fn load_bundle(source: &dyn MapSource, ident: &MapIdent, secret_threshold: u32) -> Result<Option<MapBundle>> {
    let Some((mut atlas, mut raw_info)) = fetch_page(source, ident, "")? else {
        info!(map = %ident, "map documents absent, skipping");
        return Ok(None);
    };

    let mut pages = Vec::new();
    if ident.map_area_id > secret_threshold {
        let mut next = spot_count(&raw_info);
        loop {
            let Some((page_atlas, page_info)) = fetch_page(source, ident, &next.to_string())? else {
                debug!(map = %ident, page = next, "secret pages drained");
                break;
            };
            let added = spot_count(&page_info);
            atlas.extend(page_atlas);
            raw_info = merge_info(&raw_info, &page_info);
            pages.push(next);
            if added == 0 {
                // The next suffix would be the same page again.
                break;
            }
            next += added;
        }
    }

    let info: MapInfo = serde_json::from_value(raw_info).map_err(|e| GraphError::InvalidDocument {
        path: info_path(ident, ""),
        message: e.to_string(),
    })?;
    if !pages.is_empty() {
        info!(map = %ident, pages = ?pages, spots = info.spots.len(), "merged secret pages");
    }
    Ok(Some(MapBundle { ident: *ident, atlas, info, pages }))
}
