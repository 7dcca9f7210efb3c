use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use spotgraph_builder::{aggregate, run_batch, BatchConfig};
use spotgraph_core::{BuildOptions, Procedure};

#[derive(Parser, Debug)]
#[command(name = "spotgraph-builder", version, about = "Build spot graphs, diagrams and POI tables from map documents")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Directory holding start2.json and the per-area map documents
    #[arg(long = "maps-dir", value_name = "PATH", default_value = "maps", global = true)]
    maps_dir: PathBuf,

    /// Output tree root
    #[arg(long = "out-dir", value_name = "PATH", default_value = "out", global = true)]
    out_dir: PathBuf,

    /// Directory holding notation.json and the aggregated corpora
    #[arg(long = "data-dir", value_name = "PATH", default_value = "data", global = true)]
    data_dir: PathBuf,

    /// Maps processed concurrently
    #[arg(long = "jobs", value_name = "N", global = true)]
    jobs: Option<usize>,

    #[arg(long = "fit-tolerance", value_name = "RATIO", global = true)]
    fit_tolerance: Option<f64>,

    /// Nodes closer than this many pixels are merged
    #[arg(long = "merge-radius", value_name = "PX", global = true)]
    merge_radius: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a procedure over every map
    Build {
        /// plain, autoname, dst, genpoi, icon or sync
        #[arg(default_value = "plain", value_parser = parse_procedure)]
        procedure: Procedure,
    },
    /// Merge every map's poi.json into final.json and final_latest.json
    Aggregate,
}

fn parse_procedure(s: &str) -> std::result::Result<Procedure, String> {
    s.parse().map_err(|e: spotgraph_core::pipeline::UnknownProcedure| e.to_string())
}

impl Args {
    fn options(&self) -> BuildOptions {
        let mut o = BuildOptions::from_env();
        if let Some(j) = self.jobs {
            o.jobs = j.max(1);
        }
        if let Some(t) = self.fit_tolerance {
            o.fit_tolerance = t;
        }
        if let Some(r) = self.merge_radius {
            o.merge_radius = r;
        }
        o
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_ansi(false).json().finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let args = Args::parse();
    info!(?args, "starting builder");
    let options = args.options();

    match args.command {
        Command::Build { procedure } => {
            let cfg = BatchConfig {
                maps_dir: args.maps_dir.clone(),
                out_dir: args.out_dir.clone(),
                data_dir: args.data_dir.clone(),
                procedure,
                options,
            };
            let summary = run_batch(cfg).await?;
            if !summary.is_success() {
                for f in &summary.failed {
                    warn!(map = %f.map, error = %f.error, "failed map");
                }
                anyhow::bail!("{} of {} maps failed", summary.failed.len(), summary.processed + summary.failed.len());
            }
        }
        Command::Aggregate => {
            aggregate(&args.out_dir, &args.data_dir)?;
        }
    }
    Ok(())
}
