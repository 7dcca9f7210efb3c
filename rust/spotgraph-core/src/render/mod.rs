//! Output formats for a reconciled graph.

pub mod poi;
pub mod svg;

pub use poi::Poi;
pub use svg::Diagram;
