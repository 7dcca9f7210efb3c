use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tracing::{error, info};

use spotgraph_core::aggregate::{collect_out_dir, write_aggregates};
use spotgraph_core::{process_map, BuildOptions, FsSource, GraphError, Layout, MapIdent, MapOutcome, Procedure};

#[derive(Clone, Debug)]
pub struct BatchConfig {
    pub maps_dir: PathBuf,
    pub out_dir: PathBuf,
    pub data_dir: PathBuf,
    pub procedure: Procedure,
    pub options: BuildOptions,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapFailure {
    pub map: MapIdent,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub processed: usize,
    /// Maps listed in the constants document whose documents are absent.
    pub skipped: usize,
    pub failed: Vec<MapFailure>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// `None` when the run was aborted before this map started.
type TaskResult = Option<std::result::Result<Option<MapOutcome>, GraphError>>;

/// Runs `procedure` over every map of the constants document, at most `options.jobs`
/// maps at a time. Per-map failures are collected in the summary; a run-fatal error
/// stops new maps from starting and is returned once in-flight maps finish.
pub async fn run_batch(cfg: BatchConfig) -> Result<BatchSummary> {
    let source = Arc::new(FsSource::new(&cfg.maps_dir));
    let constants = source.constants().context("loading map list")?;
    let layout = Arc::new(Layout::new(&cfg.out_dir, &cfg.data_dir));
    let options = Arc::new(cfg.options.clone());
    let jobs = cfg.options.jobs.max(1);
    let semaphore = Arc::new(Semaphore::new(jobs));
    let abort = Arc::new(AtomicBool::new(false));

    info!(maps = constants.api_mst_mapinfo.len(), jobs, procedure = %cfg.procedure, "starting batch");

    let mut handles = Vec::with_capacity(constants.api_mst_mapinfo.len());
    for ident in constants.api_mst_mapinfo {
        if abort.load(Ordering::SeqCst) {
            break;
        }
        let permit = semaphore.clone().acquire_owned().await.context("worker pool closed")?;
        let (source, layout, options, abort) = (source.clone(), layout.clone(), options.clone(), abort.clone());
        let procedure = cfg.procedure;
        let handle = tokio::task::spawn_blocking(move || -> TaskResult {
            let _permit = permit;
            if abort.load(Ordering::SeqCst) {
                return None;
            }
            let res = process_map(&*source, &ident, procedure, &layout, &options);
            if matches!(&res, Err(e) if e.is_run_fatal()) {
                abort.store(true, Ordering::SeqCst);
            }
            Some(res)
        });
        handles.push((ident, handle));
    }

    let mut summary = BatchSummary::default();
    let mut fatal: Option<(MapIdent, GraphError)> = None;
    for (ident, handle) in handles {
        match handle.await {
            Ok(None) => {}
            Ok(Some(Ok(Some(_)))) => summary.processed += 1,
            Ok(Some(Ok(None))) => summary.skipped += 1,
            Ok(Some(Err(e))) if e.is_run_fatal() => {
                error!(map = %ident, error = %e, "run aborted");
                fatal.get_or_insert((ident, e));
            }
            Ok(Some(Err(e))) => {
                error!(map = %ident, error = %e, class = ?e.class(), "map failed");
                summary.failed.push(MapFailure { map: ident, error: e.to_string() });
            }
            Err(join) => {
                error!(map = %ident, error = %join, "map task panicked");
                summary.failed.push(MapFailure { map: ident, error: join.to_string() });
            }
        }
    }

    if let Some((ident, e)) = fatal {
        return Err(anyhow::Error::new(e).context(format!("run aborted at map {ident}")));
    }
    info!(
        processed = summary.processed,
        skipped = summary.skipped,
        failed = summary.failed.len(),
        "batch finished"
    );
    Ok(summary)
}

/// Collects every map's `poi.json` under `out_dir` into `final.json` and
/// `final_latest.json` in `data_dir`.
pub fn aggregate(out_dir: &Path, data_dir: &Path) -> Result<(usize, usize)> {
    let corpus = collect_out_dir(out_dir).with_context(|| format!("reading {}", out_dir.display()))?;
    let (all, latest) = write_aggregates(data_dir, &corpus).context("writing aggregates")?;
    info!(all, latest, "wrote aggregates");
    Ok((all, latest))
}
