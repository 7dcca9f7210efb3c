//! Route/spot diagrams as SVG text.
//!
//! Draws are collected per layer and serialized by [`Diagram::finish`]; a diagram with
//! nothing drawn produces no document at all.

use std::fmt::Write;

use tracing::warn;

use crate::config::{CANVAS_HEIGHT, CANVAS_WIDTH, ICON_OFFSET};
use crate::graph::MapGraph;
use crate::models::CellData;

const START_FILL: &str = "#fd0";
const SPOT_FILL: &str = "#d00";

const ARROW_DEFS: &str = r##"<defs>
  <marker id="arrow" refX="7" refY="2" markerWidth="6" markerHeight="9" orient="auto" markerUnits="strokeWidth">
    <path d="M0,0 L0,4 L7,2 z" fill="#000" />
  </marker>
</defs>"##;

/// `(colour, x, y, width, height)` of each cell icon image, relative to its anchor.
const ICONS: [(i32, f64, f64, u32, u32); 9] = [
    (2, -10.0, -10.0, 20, 20),
    (3, -10.0, -10.0, 20, 20),
    (4, -10.0, -10.0, 20, 20),
    (5, -18.0, -25.0, 37, 40),
    (6, -10.0, -10.0, 20, 20),
    (7, -35.0, -22.0, 71, 45),
    (8, -25.0, -25.0, 49, 49),
    (9, -10.0, -10.0, 20, 20),
    (10, -24.0, -20.0, 57, 32),
];

/// Escapes the five XML special characters.
pub fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

fn icon_defs() -> String {
    let mut out = String::from("<defs>\n");
    for (n, x, y, w, h) in ICONS {
        let _ = writeln!(
            out,
            r#"  <image id="spot{n}" x="{x:.1}" y="{y:.1}" width="{w}" height="{h}" xlink:href="spoticons/{n}.png" />"#
        );
    }
    out.push_str("</defs>");
    out
}

#[derive(Clone, Debug)]
pub struct Diagram {
    width: u32,
    height: u32,
    icon_offset: (i32, i32),
    defs: Vec<String>,
    edges: Vec<String>,
    nodes: Vec<String>,
    icons: Vec<String>,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new(CANVAS_WIDTH, CANVAS_HEIGHT)
    }
}

impl Diagram {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            icon_offset: ICON_OFFSET,
            defs: Vec::new(),
            edges: Vec::new(),
            nodes: Vec::new(),
            icons: Vec::new(),
        }
    }

    pub fn with_icon_offset(mut self, offset: (i32, i32)) -> Self {
        self.icon_offset = offset;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty() && self.edges.is_empty() && self.nodes.is_empty() && self.icons.is_empty()
    }

    fn push_def(&mut self, def: String) {
        if !self.defs.contains(&def) {
            self.defs.push(def);
        }
    }

    /// One arrowed line per route with a start, labelled with the route id at its midpoint.
    pub fn draw_routes(&mut self, graph: &MapGraph) {
        self.push_def(ARROW_DEFS.to_string());
        for route in graph.routes.values() {
            let Some(s) = route.start else { continue };
            let e = route.end;
            let mx = (s.x + e.x) as f64 / 2.0;
            let my = (s.y + e.y) as f64 / 2.0;
            self.edges.push(format!(
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="black" stroke-width="2" marker-end="url(#arrow)" />"#,
                s.x, s.y, e.x, e.y
            ));
            self.edges.push(format!(
                r#"<text x="{mx}" y="{my}" font-family="sans-serif" font-size="12">{}</text>"#,
                xml_escape(&route.id)
            ));
        }
    }

    /// A dot and a bold label per node; tags are appended in parentheses.
    pub fn draw_spots(&mut self, graph: &MapGraph) {
        for node in graph.nodes.values() {
            let fill = if node.is_start() { START_FILL } else { SPOT_FILL };
            let font_size = if node.label.chars().count() > 1 { 12 } else { 16 };
            let mut text = node.label.clone();
            if !node.tags.is_empty() {
                let tags: Vec<String> = node.tags.iter().map(ToString::to_string).collect();
                let _ = write!(text, "({})", tags.join(","));
            }
            let c = node.coord;
            self.nodes.push(format!(r#"<circle cx="{}" cy="{}" r="5" style="fill:{fill};"/>"#, c.x, c.y));
            self.nodes.push(format!(
                r#"<text class="label" x="{}" y="{}" fill="{fill}" font-family="sans-serif" font-weight="bold" font-size="{font_size}">{}</text>"#,
                c.x,
                c.y + font_size,
                xml_escape(&text)
            ));
        }
    }

    /// Event icons for cells whose colour has one (2 to 10), anchored at the route end.
    pub fn draw_icons(&mut self, graph: &MapGraph, cells: &CellData) {
        self.push_def(icon_defs());
        for cell in &cells.api_cell_data {
            let (Some(no), Some(color)) = (cell.api_no, cell.api_color_no) else { continue };
            if !(2..=10).contains(&color) {
                continue;
            }
            let Some(route) = graph.routes.get(&no.to_string()) else {
                warn!(route = no, "cell refers to an unknown route");
                continue;
            };
            let x = route.end.x + self.icon_offset.0;
            let y = route.end.y + self.icon_offset.1;
            self.icons.push(format!(r##"<use xlink:href="#spot{color}" x="{x}" y="{y}"/>"##));
        }
    }

    /// The SVG document, or `None` when nothing was drawn.
    pub fn finish(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut out = String::new();
        let _ = writeln!(out, r#"<?xml version="1.0"?>"#);
        let _ = writeln!(
            out,
            r#"<svg version="1.1" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{}" height="{}">"#,
            self.width, self.height
        );
        out.push_str("<style type=\"text/css\"> <![CDATA[\n  .label {\n    stroke: black;\n    stroke-width: 0.3px;\n  }\n]]> </style>\n");
        for line in self.defs.iter().chain(&self.edges).chain(&self.nodes).chain(&self.icons) {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("</svg>\n");
        Some(out)
    }
}
