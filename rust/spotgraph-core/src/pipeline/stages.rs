use tracing::{debug, info, warn};

use crate::aggregate::POI_FILE;
use crate::error::{GraphError, Result};
use crate::fit::{fit, FitOptions};
use crate::json::{read_json_opt, write_bytes, write_json};
use crate::models::{CellData, Tag};
use crate::naming::{apply_labels, AnnotationSync, AutoNaming, LabelTable, ManualNaming, Naming, NamingStrategy};
use crate::notation::NOTATION_FILE;
use crate::render::Poi;

use super::{MapContext, Stage, CELLDATA_FILE, DIAGRAM_FILE, SPOTS_FILE, UNNAMED_FILE};

fn load_cells(ctx: &MapContext) -> Result<CellData> {
    read_json_opt(&ctx.out_file(CELLDATA_FILE))?
        .ok_or_else(|| GraphError::MissingSideInput { file: CELLDATA_FILE, dir: ctx.out_dir.clone() })
}

fn assign_with(strategy: &dyn NamingStrategy, ctx: &MapContext) -> Result<Naming> {
    let naming = strategy.assign(&ctx.graph)?;
    debug!(map = %ctx.ident, strategy = strategy.name(), labels = naming.labels.len(), unnamed = naming.unnamed.len(), "labels assigned");
    Ok(naming)
}

/// Merges near-duplicate nodes and snaps route starts; afterwards no route may dangle.
pub struct FitStage;

impl Stage for FitStage {
    fn name(&self) -> &'static str {
        "fit"
    }

    fn run(&self, ctx: &mut MapContext) -> Result<()> {
        let report = fit(&mut ctx.graph, &FitOptions::from(&ctx.options));
        if let Some(route) = ctx.graph.dangling_routes().first() {
            let r = &ctx.graph.routes[*route];
            let missing = r.start.filter(|s| !ctx.graph.nodes.contains_key(&s.key())).unwrap_or(r.end);
            return Err(GraphError::DanglingRoute { route: r.id.clone(), coord_key: missing.key() });
        }
        ctx.fit_report = Some(report);
        Ok(())
    }
}

/// Labels from `spots.json`; nodes missing from it are reported in `spots_unnamed.json`.
pub struct ManualNameStage;

impl Stage for ManualNameStage {
    fn name(&self) -> &'static str {
        "manual-name"
    }

    fn run(&self, ctx: &mut MapContext) -> Result<()> {
        let path = ctx.out_file(SPOTS_FILE);
        if !path.exists() {
            write_json(&path, &LabelTable::new())?;
        }
        let naming = assign_with(&ManualNaming::load(&path)?, ctx)?;
        apply_labels(&mut ctx.graph, &naming.labels);
        ctx.unnamed = naming.unnamed.len();
        if !naming.unnamed.is_empty() {
            write_json(&ctx.out_file(UNNAMED_FILE), &naming.unnamed)?;
            warn!(dir = %ctx.out_dir.display(), unnamed = naming.unnamed.len(), "unnamed spots found, set their names in spots.json");
        }
        Ok(())
    }
}

/// Letters by document order, persisted to `spots.json` for manual review.
pub struct AutoNameStage;

impl Stage for AutoNameStage {
    fn name(&self) -> &'static str {
        "auto-name"
    }

    fn run(&self, ctx: &mut MapContext) -> Result<()> {
        let naming = assign_with(&AutoNaming, ctx)?;
        apply_labels(&mut ctx.graph, &naming.labels);
        write_json(&ctx.out_file(SPOTS_FILE), &naming.labels)
    }
}

/// Overwrites `spots.json` with the curated labels for this map.
pub struct SyncAnnotationStage;

impl Stage for SyncAnnotationStage {
    fn name(&self) -> &'static str {
        "sync-annotation"
    }

    fn run(&self, ctx: &mut MapContext) -> Result<()> {
        let sync = AnnotationSync::new(ctx.data_dir.join(NOTATION_FILE), &ctx.out_dir);
        let naming = assign_with(&sync, ctx)?;
        if naming.labels.is_empty() {
            return Ok(());
        }
        write_json(&ctx.out_file(SPOTS_FILE), &naming.labels)
    }
}

/// Adds each cell's distance value to the tags of its route's end node.
pub struct TagDistanceStage;

impl Stage for TagDistanceStage {
    fn name(&self) -> &'static str {
        "tag-distance"
    }

    fn run(&self, ctx: &mut MapContext) -> Result<()> {
        let cells = load_cells(ctx)?;
        for cell in cells.api_cell_data {
            let (Some(no), Some(distance)) = (cell.api_no, cell.api_distance) else { continue };
            let Some(end) = ctx.graph.routes.get(&no.to_string()).map(|r| r.end) else {
                warn!(map = %ctx.ident, route = no, "cell refers to an unknown route");
                continue;
            };
            if !ctx.graph.add_tag(&end, Tag::Num(distance)) {
                return Err(GraphError::DanglingRoute { route: no.to_string(), coord_key: end.key() });
            }
        }
        Ok(())
    }
}

pub struct DrawRoutesStage;

impl Stage for DrawRoutesStage {
    fn name(&self) -> &'static str {
        "draw-routes"
    }

    fn run(&self, ctx: &mut MapContext) -> Result<()> {
        ctx.diagram.draw_routes(&ctx.graph);
        Ok(())
    }
}

pub struct DrawSpotsStage;

impl Stage for DrawSpotsStage {
    fn name(&self) -> &'static str {
        "draw-spots"
    }

    fn run(&self, ctx: &mut MapContext) -> Result<()> {
        ctx.diagram.draw_spots(&ctx.graph);
        Ok(())
    }
}

pub struct DrawIconsStage;

impl Stage for DrawIconsStage {
    fn name(&self) -> &'static str {
        "draw-icons"
    }

    fn run(&self, ctx: &mut MapContext) -> Result<()> {
        let cells = load_cells(ctx)?;
        ctx.diagram.draw_icons(&ctx.graph, &cells);
        Ok(())
    }
}

/// Writes `draw.svg` when anything was drawn.
pub struct WriteDiagramStage;

impl Stage for WriteDiagramStage {
    fn name(&self) -> &'static str {
        "write-diagram"
    }

    fn run(&self, ctx: &mut MapContext) -> Result<()> {
        let Some(svg) = ctx.diagram.finish() else { return Ok(()) };
        let path = ctx.out_file(DIAGRAM_FILE);
        write_bytes(&path, svg.as_bytes())?;
        info!(path = %path.display(), "wrote diagram");
        Ok(())
    }
}

pub struct WritePoiStage;

impl Stage for WritePoiStage {
    fn name(&self) -> &'static str {
        "write-poi"
    }

    fn run(&self, ctx: &mut MapContext) -> Result<()> {
        let poi = Poi::from_graph(&ctx.graph)?;
        write_json(&ctx.out_file(POI_FILE), &poi)
    }
}
