//! Sprite lookup over one or more sprite sheets.
//!
//! A sheet's frames are keyed `"{prefix}_{name}"`. Lookups walk the sheets in the order
//! they were registered and the first sheet holding the key wins, so overlay sheets
//! appended with [`Atlas::extend`] can only add names, never shadow existing ones.

use indexmap::IndexMap;
use tracing::warn;

use crate::models::{AtlasDocument, Frame, Rect, Size};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sheet {
    pub prefix: String,
    pub frames: IndexMap<String, Frame>,
}

impl Sheet {
    pub fn new(prefix: impl Into<String>, frames: IndexMap<String, Frame>) -> Self {
        Self { prefix: prefix.into(), frames }
    }

    fn find(&self, name: &str, prefix: Option<&str>) -> Option<&Frame> {
        let p = prefix.unwrap_or(self.prefix.as_str());
        if let Some(f) = self.frames.get(&format!("{p}_{name}")) {
            return Some(f);
        }
        // Callers may pass an already-qualified key.
        match name.strip_prefix(p) {
            Some(rest) if rest.starts_with('_') => self.frames.get(name),
            _ => None,
        }
    }
}

/// Result of [`Atlas::resolve`]; [`Sprite::EMPTY`] when nothing matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sprite {
    pub rect: Rect,
    pub source_size: Size,
    pub sheet: Option<usize>,
}

impl Sprite {
    pub const EMPTY: Sprite = Sprite {
        rect: Rect { x: 0, y: 0, w: 0, h: 0 },
        source_size: Size { w: 0, h: 0 },
        sheet: None,
    };

    pub fn is_empty(&self) -> bool {
        self.sheet.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Atlas {
    sheets: Vec<Sheet>,
}

impl Atlas {
    pub fn new(sheet: Sheet) -> Self {
        Self { sheets: vec![sheet] }
    }

    pub fn from_document(doc: AtlasDocument, prefix: impl Into<String>) -> Self {
        Self::new(Sheet::new(prefix, doc.frames))
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.iter().all(|s| s.frames.is_empty())
    }

    fn find(&self, name: &str, prefix: Option<&str>) -> Option<(usize, &Frame)> {
        self.sheets
            .iter()
            .enumerate()
            .find_map(|(i, s)| s.find(name, prefix).map(|f| (i, f)))
    }

    pub fn lookup(&self, name: &str, prefix: Option<&str>) -> Option<&Frame> {
        self.find(name, prefix).map(|(_, f)| f)
    }

    pub fn has(&self, name: &str, prefix: Option<&str>) -> bool {
        self.find(name, prefix).is_some()
    }

    /// Resolves a sprite; a miss is logged and yields [`Sprite::EMPTY`].
    pub fn resolve(&self, name: &str, prefix: Option<&str>) -> Sprite {
        match self.find(name, prefix) {
            Some((sheet, f)) => Sprite { rect: f.frame, source_size: f.source_size, sheet: Some(sheet) },
            None => {
                warn!(sprite = %name, prefix = ?prefix, "empty sprite, check id");
                Sprite::EMPTY
            }
        }
    }

    /// Appends every sheet of `other` after the existing ones.
    pub fn extend(&mut self, other: Atlas) {
        self.sheets.extend(other.sheets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(x: i32, w: i32, h: i32) -> Frame {
        Frame {
            frame: Rect { x, y: 0, w, h },
            source_size: Size { w, h },
            ..Frame::default()
        }
    }

    fn sheet(prefix: &str, entries: &[(&str, Frame)]) -> Sheet {
        Sheet::new(prefix, entries.iter().map(|(k, f)| (k.to_string(), f.clone())).collect())
    }

    #[test]
    fn resolves_qualified_and_bare_names() {
        let atlas = Atlas::new(sheet("map001", &[("map001_route_5", frame(4, 10, 12))]));
        let a = atlas.resolve("route_5", None);
        let b = atlas.resolve("map001_route_5", Some("map001"));
        assert!(!a.is_empty());
        assert_eq!(a, b);
        assert_eq!(a.rect.x, 4);
    }

    #[test]
    fn miss_is_empty_sentinel() {
        let atlas = Atlas::new(sheet("map001", &[("map001_route_5", frame(4, 10, 12))]));
        let s = atlas.resolve("nonexistent", None);
        assert!(s.is_empty());
        assert_eq!(s, Sprite::EMPTY);
        assert!(atlas.lookup("nonexistent", None).is_none());
    }

    #[test]
    fn explicit_prefix_overrides_sheet_prefix() {
        let atlas = Atlas::new(sheet("a", &[("b_x", frame(1, 1, 1))]));
        assert!(!atlas.has("x", None));
        assert!(atlas.has("x", Some("b")));
    }

    #[test]
    fn first_sheet_wins_after_extend() {
        let mut atlas = Atlas::new(sheet("m", &[("m_route_1", frame(1, 2, 2))]));
        atlas.extend(Atlas::new(sheet("m", &[("m_route_1", frame(99, 2, 2)), ("m_route_9", frame(9, 2, 2))])));
        assert_eq!(atlas.sheets().len(), 2);
        assert_eq!(atlas.resolve("route_1", None).rect.x, 1);
        let nine = atlas.resolve("route_9", None);
        assert_eq!(nine.rect.x, 9);
        assert_eq!(nine.sheet, Some(1));
    }
}
