use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{GraphError, Result};

/// Reads and decodes a JSON file; a missing file is `Ok(None)`.
pub fn read_json_opt<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(GraphError::io(path, e)),
    };
    serde_json::from_slice(&bytes).map(Some).map_err(|e| GraphError::json(path, e))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    read_json_opt(path)?.ok_or_else(|| {
        GraphError::io(path, std::io::Error::new(ErrorKind::NotFound, "file not found"))
    })
}

/// Writes `value` as pretty JSON, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| GraphError::json(path, e))?;
    write_bytes(path, &bytes)
}

pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| GraphError::io(parent, e))?;
    }
    fs::write(path, bytes).map_err(|e| GraphError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn missing_file_is_none_and_nested_write_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a/b/c.json");
        assert!(read_json_opt::<Value>(&p).unwrap().is_none());
        assert!(read_json::<Value>(&p).is_err());
        write_json(&p, &json!({"k": [1, 2]})).unwrap();
        let v: Value = read_json(&p).unwrap();
        assert_eq!(v, json!({"k": [1, 2]}));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("bad.json");
        fs::write(&p, b"{not json").unwrap();
        let err = read_json_opt::<Value>(&p).unwrap_err();
        assert!(matches!(err, GraphError::Json { .. }));
    }
}
