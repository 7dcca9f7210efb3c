//! Label assignment policies.
//!
//! Every strategy maps the graph's coordinate keys to short labels. Start nodes and
//! ordinary nodes use disjoint label spaces: start nodes are numbered `1, 2, ...`,
//! everything else is alphabetic `A..Z, AA, AB, ...`.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::warn;

use crate::error::{GraphError, Result};
use crate::graph::MapGraph;
use crate::json::read_json_opt;
use crate::notation::NotationCorpus;

/// Coordinate key -> label.
pub type LabelTable = IndexMap<String, String>;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Naming {
    pub labels: LabelTable,
    /// Nodes that only received a provisional label.
    pub unnamed: LabelTable,
}

pub trait NamingStrategy {
    fn name(&self) -> &'static str;
    fn assign(&self, graph: &MapGraph) -> Result<Naming>;
}

pub fn apply_labels(graph: &mut MapGraph, labels: &LabelTable) {
    for node in graph.nodes.values_mut() {
        if let Some(l) = labels.get(&node.coord_key) {
            node.label = l.clone();
        }
    }
}

/// Bijective base-26: 0 -> `A`, 25 -> `Z`, 26 -> `AA`.
pub fn alpha_label(index: usize) -> String {
    let mut n = index as u128 + 1;
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Inverse of [`alpha_label`].
pub fn alpha_index(label: &str) -> Option<usize> {
    if label.is_empty() || !label.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let mut acc = 0usize;
    for b in label.bytes() {
        acc = acc.checked_mul(26)?.checked_add((b - b'A' + 1) as usize)?;
    }
    Some(acc - 1)
}

/// The label `offset` steps after `anchor`, in the anchor's own label space.
pub fn continue_label(anchor: &str, offset: usize) -> Option<String> {
    if let Ok(n) = anchor.parse::<u64>() {
        return n.checked_add(offset as u64).map(|v| v.to_string());
    }
    alpha_index(&anchor.to_ascii_uppercase())?.checked_add(offset).map(alpha_label)
}

/// Autofill sequence: the first cell is the start point `1`, then `A`, `B`, ...
pub fn autofill_label(index: usize) -> String {
    if index == 0 {
        "1".to_string()
    } else {
        alpha_label(index - 1)
    }
}

/// Operator-maintained labels (`spots.json`).
#[derive(Clone, Debug, Default)]
pub struct ManualNaming {
    pub table: LabelTable,
}

impl ManualNaming {
    pub fn new(table: LabelTable) -> Self {
        Self { table }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(read_json_opt(path)?.unwrap_or_default()))
    }
}

impl NamingStrategy for ManualNaming {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn assign(&self, graph: &MapGraph) -> Result<Naming> {
        let mut naming = Naming::default();
        for key in graph.nodes.keys() {
            match self.table.get(key) {
                Some(l) => {
                    naming.labels.insert(key.clone(), l.clone());
                }
                None => {
                    naming.labels.insert(key.clone(), key.clone());
                    naming.unnamed.insert(key.clone(), key.clone());
                }
            }
        }
        Ok(naming)
    }
}

/// Letters from document order; works for most maps but should be reviewed by hand.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoNaming;

impl NamingStrategy for AutoNaming {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn assign(&self, graph: &MapGraph) -> Result<Naming> {
        let mut naming = Naming::default();
        for (key, node) in &graph.nodes {
            let label = match &node.start_label {
                Some(s) => s.clone(),
                None => match u8::try_from(64 + node.source_index).ok().filter(u8::is_ascii_uppercase) {
                    Some(c) => char::from(c).to_string(),
                    None => {
                        warn!(spot = %node.label, index = node.source_index, "spot name is out of [A-Z], check it manually");
                        node.label.clone()
                    }
                },
            };
            naming.labels.insert(key.clone(), label);
        }
        Ok(naming)
    }
}

/// Relabels `cells` from `anchor` onwards so they continue contiguously from `label`.
/// Cells before the anchor keep their `base` labels. An anchor that is not part of
/// `cells` only sets its own label.
pub fn relabel_from(cells: &[String], anchor: &str, label: &str, base: &LabelTable) -> LabelTable {
    let mut out = base.clone();
    out.insert(anchor.to_string(), label.to_string());
    let Some(pos) = cells.iter().position(|c| c == anchor) else {
        return out;
    };
    for (offset, cell) in cells.iter().enumerate().skip(pos + 1).map(|(i, c)| (i - pos, c)) {
        match continue_label(label, offset) {
            Some(next) => {
                out.insert(cell.clone(), next);
            }
            None => break,
        }
    }
    out
}

/// Live-edit continuation over the graph's node order.
#[derive(Clone, Debug)]
pub struct SequentialNaming {
    pub anchor: String,
    pub label: String,
    pub base: LabelTable,
}

impl SequentialNaming {
    pub fn new(anchor: impl Into<String>, label: impl Into<String>, base: LabelTable) -> Self {
        Self { anchor: anchor.into(), label: label.into(), base }
    }

    pub fn autofill(cells: &[String]) -> LabelTable {
        cells.iter().enumerate().map(|(i, c)| (c.clone(), autofill_label(i))).collect()
    }
}

impl NamingStrategy for SequentialNaming {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn assign(&self, graph: &MapGraph) -> Result<Naming> {
        let cells: Vec<String> = graph.nodes.keys().cloned().collect();
        if !cells.contains(&self.anchor) {
            warn!(anchor = %self.anchor, "anchor cell is not a node of this map");
        }
        let table = relabel_from(&cells, &self.anchor, &self.label, &self.base);
        let mut naming = Naming::default();
        for key in &cells {
            match table.get(key) {
                Some(l) => {
                    naming.labels.insert(key.clone(), l.clone());
                }
                None => {
                    naming.unnamed.insert(key.clone(), key.clone());
                }
            }
        }
        Ok(naming)
    }
}

/// Parses `(world, map)` from an output directory named `...map{world}-{map}`.
pub fn parse_map_dir(dir: &Path) -> Option<(u32, u32)> {
    let name = dir.file_name()?.to_str()?;
    let rest = &name[name.rfind("map")? + 3..];
    let (w, m) = rest.split_once('-')?;
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(w) || !digits(m) {
        return None;
    }
    Some((w.parse().ok()?, m.parse().ok()?))
}

/// Labels taken from the curated annotation corpus.
#[derive(Clone, Debug)]
pub struct AnnotationSync {
    pub corpus_path: PathBuf,
    pub out_dir: PathBuf,
}

impl AnnotationSync {
    pub fn new(corpus_path: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self { corpus_path: corpus_path.into(), out_dir: out_dir.into() }
    }

    pub fn corpus_key(&self) -> Result<String> {
        let (w, m) = parse_map_dir(&self.out_dir).ok_or_else(|| {
            GraphError::Config(format!("can't match dir to map id: {}", self.out_dir.display()))
        })?;
        Ok(format!("{w}{m}"))
    }
}

impl NamingStrategy for AnnotationSync {
    fn name(&self) -> &'static str {
        "annotation"
    }

    fn assign(&self, _graph: &MapGraph) -> Result<Naming> {
        let corpus = NotationCorpus::load(&self.corpus_path)?.ok_or_else(|| {
            GraphError::Config(format!("annotation file not found: {}", self.corpus_path.display()))
        })?;
        let key = self.corpus_key()?;
        let labels = match corpus.get(&key) {
            Some(t) => t.clone(),
            None => {
                warn!(map = %key, "no annotations for map");
                LabelTable::new()
            }
        };
        Ok(Naming { labels, unnamed: LabelTable::new() })
    }
}
