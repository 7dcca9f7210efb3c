//! In-memory notation corpus behind an atomic pointer, persisted on demand.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use tracing::info;

use spotgraph_core::naming::LabelTable;
use spotgraph_core::notation::NOTATION_FILE;
use spotgraph_core::{GraphError, NotationCorpus};

/// Readers never block; writers are serialized so no update is lost.
pub struct NotationStore {
    path: PathBuf,
    corpus: ArcSwap<NotationCorpus>,
    writer: Mutex<()>,
}

impl NotationStore {
    pub fn new(path: impl Into<PathBuf>, corpus: NotationCorpus) -> Self {
        Self { path: path.into(), corpus: ArcSwap::from_pointee(corpus), writer: Mutex::new(()) }
    }

    /// Opens `{data_dir}/notation.json`; a missing file starts an empty corpus.
    pub fn open(data_dir: &Path) -> Result<Self, GraphError> {
        let store = Self::new(data_dir.join(NOTATION_FILE), NotationCorpus::new());
        if let Some(file) = NotationCorpus::load(&store.path)? {
            // in-memory entries win; at startup there are none
            store.update(|c| c.absorb_missing(file));
        }
        info!(path = %store.path.display(), maps = store.snapshot().len(), "notation corpus loaded");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> Arc<NotationCorpus> {
        self.corpus.load_full()
    }

    pub fn table(&self, key: &str) -> Option<LabelTable> {
        self.corpus.load().get(key).cloned()
    }

    fn update<R>(&self, f: impl FnOnce(&mut NotationCorpus) -> R) -> R {
        let _guard = self.writer.lock().unwrap_or_else(|p| p.into_inner());
        let mut next = NotationCorpus::clone(&self.corpus.load());
        let out = f(&mut next);
        self.corpus.store(Arc::new(next));
        out
    }

    pub fn replace(&self, key: &str, table: LabelTable) -> LabelTable {
        self.update(|c| {
            c.replace(key, table);
            c.get(key).cloned().unwrap_or_default()
        })
    }

    pub fn update_one(&self, key: &str, cells: &[String], cell: &str, label: &str, continue_sequence: bool) -> LabelTable {
        self.update(|c| c.update_one(key, cells, cell, label, continue_sequence).clone())
    }

    pub fn autofill(&self, key: &str, cells: &[String]) -> LabelTable {
        self.update(|c| c.autofill(key, cells).clone())
    }

    /// Writes the current corpus; returns the number of maps written.
    pub fn save(&self) -> Result<usize, GraphError> {
        let _guard = self.writer.lock().unwrap_or_else(|p| p.into_inner());
        let corpus = self.corpus.load();
        corpus.save(&self.path)?;
        info!(path = %self.path.display(), maps = corpus.len(), "notation corpus saved");
        Ok(corpus.len())
    }

    /// Re-reads the file; its entries replace in-memory ones. `Ok(None)` when the file is absent.
    pub fn reload(&self) -> Result<Option<usize>, GraphError> {
        let Some(file) = NotationCorpus::load(&self.path)? else { return Ok(None) };
        let maps = self.update(|c| {
            c.overlay(file);
            c.len()
        });
        info!(path = %self.path.display(), maps, "notation corpus reloaded");
        Ok(Some(maps))
    }
}
