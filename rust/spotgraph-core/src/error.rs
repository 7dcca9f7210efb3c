use std::path::PathBuf;

use thiserror::Error;

/// How far a failure unwinds in a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Broken data for one map; that map is abandoned, the batch continues.
    DataIntegrity,
    /// Unexpected I/O or decode failure; the map is a failed unit.
    Transient,
    /// Operator setup mistake; the whole run stops.
    Configuration,
}

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("no sprite found for spot {spot}: tried {sprite:?}")]
    MissingRouteSprite { spot: String, sprite: String },
    #[error("route {route} references missing node {coord_key}")]
    DanglingRoute { route: String, coord_key: String },
    #[error("{file} not found in {dir}")]
    MissingSideInput { file: &'static str, dir: PathBuf },
    #[error("invalid document {path}: {message}")]
    InvalidDocument { path: String, message: String },
    #[error("configuration: {0}")]
    Config(String),
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl GraphError {
    pub fn class(&self) -> ErrorClass {
        match self {
            GraphError::MissingRouteSprite { .. }
            | GraphError::DanglingRoute { .. }
            | GraphError::MissingSideInput { .. }
            | GraphError::InvalidDocument { .. } => ErrorClass::DataIntegrity,
            GraphError::Config(_) => ErrorClass::Configuration,
            GraphError::Io { .. } | GraphError::Json { .. } => ErrorClass::Transient,
        }
    }

    pub fn is_run_fatal(&self) -> bool {
        self.class() == ErrorClass::Configuration
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GraphError::Io { path: path.into(), source }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        GraphError::Json { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_match_unwind_scope() {
        let e = GraphError::MissingRouteSprite { spot: "3".into(), sprite: "route_3".into() };
        assert_eq!(e.class(), ErrorClass::DataIntegrity);
        assert!(!e.is_run_fatal());

        let e = GraphError::Config("annotation file not found".into());
        assert!(e.is_run_fatal());

        let e = GraphError::io("x.json", std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert_eq!(e.class(), ErrorClass::Transient);
        assert!(e.to_string().contains("x.json"));
    }
}
