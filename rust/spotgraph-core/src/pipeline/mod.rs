//! Per-map processing: an ordered list of stages over one [`MapContext`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, info, info_span};

use crate::config::BuildOptions;
use crate::error::Result;
use crate::extract::extract;
use crate::fit::FitReport;
use crate::graph::MapGraph;
use crate::models::MapIdent;
use crate::render::Diagram;
use crate::source::{load_bundle, MapSource};

mod stages;

pub use stages::{
    AutoNameStage, DrawIconsStage, DrawRoutesStage, DrawSpotsStage, FitStage, ManualNameStage, SyncAnnotationStage,
    TagDistanceStage, WriteDiagramStage, WritePoiStage,
};

pub const SPOTS_FILE: &str = "spots.json";
pub const UNNAMED_FILE: &str = "spots_unnamed.json";
pub const CELLDATA_FILE: &str = "celldata.json";
pub const DIAGRAM_FILE: &str = "draw.svg";

/// Where outputs and shared data live for a run.
#[derive(Clone, Debug)]
pub struct Layout {
    pub out_root: PathBuf,
    pub data_dir: PathBuf,
}

impl Layout {
    pub fn new(out_root: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self { out_root: out_root.into(), data_dir: data_dir.into() }
    }

    /// `{out_root}/{area}/map{area}-{no}`
    pub fn map_dir(&self, ident: &MapIdent) -> PathBuf {
        self.out_root.join(ident.map_area_id.to_string()).join(ident.out_dir_name())
    }
}

/// Everything one map's stages share. Created per map and dropped afterwards.
#[derive(Debug)]
pub struct MapContext {
    pub ident: MapIdent,
    pub out_dir: PathBuf,
    pub data_dir: PathBuf,
    pub graph: MapGraph,
    pub diagram: Diagram,
    pub fit_report: Option<FitReport>,
    pub unnamed: usize,
    pub options: BuildOptions,
}

impl MapContext {
    pub fn new(ident: MapIdent, graph: MapGraph, layout: &Layout, options: &BuildOptions) -> Self {
        let diagram = Diagram::new(options.canvas_width, options.canvas_height).with_icon_offset(options.icon_offset);
        Self {
            ident,
            out_dir: layout.map_dir(&ident),
            data_dir: layout.data_dir.clone(),
            graph,
            diagram,
            fit_report: None,
            unnamed: 0,
            options: options.clone(),
        }
    }

    pub fn out_file(&self, name: &str) -> PathBuf {
        self.out_dir.join(name)
    }
}

pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut MapContext) -> Result<()>;
}

/// Named stage sequences selectable from the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Procedure {
    #[default]
    Plain,
    Autoname,
    Distance,
    Poi,
    Icon,
    Sync,
}

impl Procedure {
    pub const ALL: [Procedure; 6] =
        [Procedure::Plain, Procedure::Autoname, Procedure::Distance, Procedure::Poi, Procedure::Icon, Procedure::Sync];

    pub fn as_str(&self) -> &'static str {
        match self {
            Procedure::Plain => "plain",
            Procedure::Autoname => "autoname",
            Procedure::Distance => "dst",
            Procedure::Poi => "genpoi",
            Procedure::Icon => "icon",
            Procedure::Sync => "sync",
        }
    }

    pub fn stages(&self) -> Vec<Box<dyn Stage>> {
        match self {
            Procedure::Plain => vec![
                Box::new(FitStage),
                Box::new(ManualNameStage),
                Box::new(DrawRoutesStage),
                Box::new(DrawSpotsStage),
                Box::new(WriteDiagramStage),
            ],
            Procedure::Autoname => vec![
                Box::new(FitStage),
                Box::new(AutoNameStage),
                Box::new(DrawRoutesStage),
                Box::new(DrawSpotsStage),
                Box::new(WriteDiagramStage),
            ],
            Procedure::Distance => vec![
                Box::new(FitStage),
                Box::new(ManualNameStage),
                Box::new(TagDistanceStage),
                Box::new(DrawSpotsStage),
                Box::new(WriteDiagramStage),
            ],
            Procedure::Poi => vec![Box::new(FitStage), Box::new(ManualNameStage), Box::new(WritePoiStage)],
            Procedure::Icon => {
                vec![Box::new(FitStage), Box::new(ManualNameStage), Box::new(DrawIconsStage), Box::new(WriteDiagramStage)]
            }
            Procedure::Sync => vec![
                Box::new(FitStage),
                Box::new(SyncAnnotationStage),
                Box::new(ManualNameStage),
                Box::new(WritePoiStage),
            ],
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProcedure(pub String);

impl fmt::Display for UnknownProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Procedure::ALL.iter().map(Procedure::as_str).collect();
        write!(f, "unknown procedure {:?}, expected one of: {}", self.0, names.join(", "))
    }
}

impl std::error::Error for UnknownProcedure {}

impl FromStr for Procedure {
    type Err = UnknownProcedure;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "" | "plain" => Ok(Procedure::Plain),
            "autoname" => Ok(Procedure::Autoname),
            "dst" => Ok(Procedure::Distance),
            "genpoi" => Ok(Procedure::Poi),
            "icon" => Ok(Procedure::Icon),
            "sync" => Ok(Procedure::Sync),
            other => Err(UnknownProcedure(other.to_string())),
        }
    }
}

/// Summary of one processed map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapOutcome {
    pub nodes: usize,
    pub routes: usize,
    pub merges: usize,
    pub snap_warnings: usize,
    pub unnamed: usize,
    pub secret_pages: usize,
}

pub fn run_stages(ctx: &mut MapContext, procedure: Procedure) -> Result<()> {
    for stage in procedure.stages() {
        debug!(map = %ctx.ident, stage = stage.name(), "running stage");
        stage.run(ctx)?;
    }
    Ok(())
}

/// Loads, extracts and runs `procedure` for one map. `Ok(None)` when the map's
/// documents are absent.
pub fn process_map(
    source: &dyn MapSource,
    ident: &MapIdent,
    procedure: Procedure,
    layout: &Layout,
    options: &BuildOptions,
) -> Result<Option<MapOutcome>> {
    let span = info_span!("map", map = %ident, procedure = %procedure);
    let _guard = span.enter();

    let Some(bundle) = load_bundle(source, ident, options.secret_threshold)? else {
        return Ok(None);
    };
    let graph = extract(&bundle.info, &bundle.atlas)?;
    let mut ctx = MapContext::new(*ident, graph, layout, options);
    run_stages(&mut ctx, procedure)?;

    let report = ctx.fit_report.unwrap_or_default();
    let outcome = MapOutcome {
        nodes: ctx.graph.nodes.len(),
        routes: ctx.graph.routes.len(),
        merges: report.merges.len(),
        snap_warnings: report.warnings.len(),
        unnamed: ctx.unnamed,
        secret_pages: bundle.pages.len(),
    };
    info!(
        nodes = outcome.nodes,
        routes = outcome.routes,
        merges = outcome.merges,
        snap_warnings = outcome.snap_warnings,
        unnamed = outcome.unnamed,
        "map done"
    );
    Ok(Some(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn procedure_names_round_trip_and_stage_order() {
        for p in Procedure::ALL {
            assert_eq!(p.as_str().parse::<Procedure>().unwrap(), p);
        }
        assert_eq!("".parse::<Procedure>().unwrap(), Procedure::Plain);
        assert!("nope".parse::<Procedure>().unwrap_err().to_string().contains("genpoi"));

        let names = |p: Procedure| p.stages().iter().map(|s| s.name()).collect::<Vec<_>>();
        assert_eq!(names(Procedure::Plain), ["fit", "manual-name", "draw-routes", "draw-spots", "write-diagram"]);
        assert_eq!(names(Procedure::Autoname), ["fit", "auto-name", "draw-routes", "draw-spots", "write-diagram"]);
        assert_eq!(names(Procedure::Distance), ["fit", "manual-name", "tag-distance", "draw-spots", "write-diagram"]);
        assert_eq!(names(Procedure::Poi), ["fit", "manual-name", "write-poi"]);
        assert_eq!(names(Procedure::Icon), ["fit", "manual-name", "draw-icons", "write-diagram"]);
        assert_eq!(names(Procedure::Sync), ["fit", "sync-annotation", "manual-name", "write-poi"]);
    }

    #[test]
    fn map_dir_layout() {
        let ident = MapIdent::new(7, 2);
        let layout = Layout::new("out", "data");
        assert_eq!(layout.map_dir(&ident), PathBuf::from("out/7/map7-2"));
    }
}
