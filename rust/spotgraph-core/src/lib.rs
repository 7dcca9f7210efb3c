pub mod aggregate;
pub mod atlas;
pub mod config;
pub mod error;
pub mod extract;
pub mod fit;
pub mod graph;
pub mod json;
pub mod merge;
pub mod models;
pub mod naming;
pub mod notation;
pub mod pipeline;
pub mod render;
pub mod source;

pub use atlas::{Atlas, Sheet, Sprite};
pub use config::BuildOptions;
pub use error::{ErrorClass, GraphError, Result};
pub use graph::{MapGraph, Node, Route};
pub use models::{Coord, MapIdent};
pub use naming::{LabelTable, NamingStrategy};
pub use notation::NotationCorpus;
pub use pipeline::{process_map, Layout, MapContext, MapOutcome, Procedure, Stage};
pub use source::{FsSource, MapSource};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
