use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Absolute pixel position on a map background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Node identity: `"x,y"`.
    pub fn key(&self) -> String {
        format!("{},{}", self.x, self.y)
    }

    pub fn distance(&self, other: &Coord) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn on_grid(&self) -> bool {
        self.x % 10 == 0 && self.y % 10 == 0
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotLine {
    pub x: i32,
    pub y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

/// One raw way-point record of a map info document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spot {
    pub no: u32,
    pub x: i32,
    pub y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<SpotLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

impl Spot {
    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BgEntry {
    Name(String),
    Image { img: String },
}

impl BgEntry {
    pub fn name(&self) -> &str {
        match self {
            BgEntry::Name(s) => s,
            BgEntry::Image { img } => img,
        }
    }
}

/// Typed view over a (possibly merged) map info document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapInfo {
    pub bg: Vec<BgEntry>,
    pub spots: Vec<Spot>,
    pub labels: Vec<Value>,
    pub enemies: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airbase: Option<Value>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub w: i32,
    pub h: i32,
}

/// A named region of a sprite sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub frame: Rect,
    #[serde(default)]
    pub rotated: bool,
    #[serde(default)]
    pub trimmed: bool,
    #[serde(default)]
    pub sprite_source_size: Rect,
    pub source_size: Size,
}

/// Sprite sheet metadata (`*_image.json`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AtlasDocument {
    pub frames: IndexMap<String, Frame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// Per-cell event table side-loaded next to a map's outputs (`celldata.json`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellData {
    #[serde(default)]
    pub api_cell_data: Vec<CellDatum>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellDatum {
    #[serde(default)]
    pub api_no: Option<u32>,
    #[serde(default)]
    pub api_color_no: Option<i32>,
    #[serde(default)]
    pub api_distance: Option<i64>,
}

/// One entry of the constants document's map list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapIdent {
    #[serde(rename = "api_id")]
    pub map_id: u32,
    #[serde(rename = "api_maparea_id")]
    pub map_area_id: u32,
    #[serde(rename = "api_no")]
    pub map_no: u32,
}

impl MapIdent {
    pub fn new(map_area_id: u32, map_no: u32) -> Self {
        Self { map_id: map_area_id * 10 + map_no, map_area_id, map_no }
    }

    /// Directory holding this map's raw documents, e.g. `"007"`.
    pub fn area_dir(&self) -> String {
        format!("{:03}", self.map_area_id)
    }

    /// Raw document file stem, e.g. `"02"`.
    pub fn file_stem(&self) -> String {
        format!("{:02}", self.map_no)
    }

    /// Prefix shared by every sprite key of this map's sheets, e.g. `"map00702"`.
    pub fn sprite_prefix(&self) -> String {
        format!("map{:03}{:02}", self.map_area_id, self.map_no)
    }

    /// Output directory name, e.g. `"map7-2"`.
    pub fn out_dir_name(&self) -> String {
        format!("map{}-{}", self.map_area_id, self.map_no)
    }

    /// Key in the notation corpus, e.g. `"72"`.
    pub fn notation_key(&self) -> String {
        format!("{}{}", self.map_area_id, self.map_no)
    }

    /// Inverse of [`MapIdent::notation_key`] for the single-digit map numbers the game uses.
    pub fn from_notation_key(key: &str) -> Option<Self> {
        let id: u32 = key.parse().ok()?;
        if id < 10 {
            return None;
        }
        Some(Self::new(id / 10, id % 10))
    }
}

impl fmt::Display for MapIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.map_area_id, self.map_no)
    }
}

/// The constants document (`start2.json`); only the map list is read.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstantsDocument {
    #[serde(default)]
    pub api_mst_mapinfo: Vec<MapIdent>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tag {
    Num(i64),
    Text(String),
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Num(n) => write!(f, "{n}"),
            Tag::Text(s) => f.write_str(s),
        }
    }
}
