use std::fmt;

use thiserror::Error;

/// Leading segment every ref must carry.
pub const ROOT_MARKER: &str = "root";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefError {
    #[error("ref is empty")]
    Empty,

    #[error("ref does not start with '{ROOT_MARKER}': {0}")]
    MissingRootMarker(String),
}

/// Parsed `/`-delimited element reference.
///
/// Segments stay as raw strings: whether `Button[0]` is a stable name or
/// a synthesized type-index token is decided against the live tree at
/// resolution time, name match first. The root marker is validated at
/// parse time and not stored.
///
/// Name-first matching means an author-assigned name that textually
/// matches a synthesized token (say, a widget literally named
/// `Button[1]`) shadows the same-typed sibling that token would address,
/// and that sibling's snapshot ref stops round-tripping. Avoid names
/// shaped like `Type[index]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefPath {
    segments: Vec<String>,
}

impl RefPath {
    /// The root element itself.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, RefError> {
        if raw.is_empty() {
            return Err(RefError::Empty);
        }
        let mut parts = raw.split('/');
        match parts.next() {
            Some(ROOT_MARKER) => {}
            _ => return Err(RefError::MissingRootMarker(raw.to_string())),
        }
        // Empty segments (doubled or trailing slashes) are skipped rather
        // than failing the whole ref.
        let segments = parts
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect();
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Extend the path by one child segment.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Synthesized token for an unnamed element: `Type[index]`, where
    /// `index` counts same-typed siblings in traversal order.
    pub fn indexed_segment(type_name: &str, index: usize) -> String {
        format!("{}[{}]", type_name, index)
    }

    /// Split a `Type[index]` token. Returns `None` for anything that does
    /// not match the synthesized shape exactly.
    pub fn parse_indexed(segment: &str) -> Option<(&str, usize)> {
        let inner = segment.strip_suffix(']')?;
        let (type_name, index) = inner.split_once('[')?;
        if type_name.is_empty() {
            return None;
        }
        let index = index.parse().ok()?;
        Some((type_name, index))
    }
}

impl fmt::Display for RefPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", ROOT_MARKER)?;
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}
