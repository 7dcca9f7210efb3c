//! The curated annotation corpus (`notation.json`): per-map label tables keyed
//! `"{world}{map}"`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::json::{read_json_opt, write_json};
use crate::naming::{relabel_from, LabelTable, SequentialNaming};

pub const NOTATION_FILE: &str = "notation.json";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotationCorpus {
    maps: BTreeMap<String, LabelTable>,
}

impl NotationCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        read_json_opt(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }

    pub fn get(&self, key: &str) -> Option<&LabelTable> {
        self.maps.get(key)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Adds maps from `other` that this corpus does not have yet.
    pub fn absorb_missing(&mut self, other: NotationCorpus) {
        for (k, v) in other.maps {
            self.maps.entry(k).or_insert(v);
        }
    }

    /// Replaces maps with `other`'s versions where both have them.
    pub fn overlay(&mut self, other: NotationCorpus) {
        self.maps.extend(other.maps);
    }

    /// Replaces one map's table; labels are stored upper-cased.
    pub fn replace(&mut self, key: &str, table: LabelTable) {
        let table = table.into_iter().map(|(c, l)| (c, l.to_ascii_uppercase())).collect();
        self.maps.insert(key.to_string(), table);
    }

    /// Sets one cell's label. With `continue_sequence`, cells after it (in `cells`
    /// order) are renumbered from it.
    pub fn update_one(&mut self, key: &str, cells: &[String], cell: &str, label: &str, continue_sequence: bool) -> &LabelTable {
        let label = label.to_ascii_uppercase();
        let entry = self.maps.entry(key.to_string()).or_default();
        if continue_sequence {
            *entry = relabel_from(cells, cell, &label, entry);
        } else {
            entry.insert(cell.to_string(), label);
        }
        entry
    }

    pub fn autofill(&mut self, key: &str, cells: &[String]) -> &LabelTable {
        let entry = self.maps.entry(key.to_string()).or_default();
        *entry = SequentialNaming::autofill(cells);
        entry
    }
}
