//! # Field Paths
//!
//! Dot/bracket paths from the document root to a field, used to qualify
//! every decode error and encoder invariant violation.
//!
//! Rendering rules:
//!
//! - Object keys are joined with `.` (`credentials_supported.UniversityDegree`).
//! - Array positions are written as `[n]` (`display[1].locale`).
//! - Keys that would make the path ambiguous (empty, or containing `.`,
//!   `[`, `]` or `"`) are written in bracket-quoted form: `["a.b"]`.
//! - The empty path renders as `(root)`.

use std::fmt;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// An object member.
    Key(String),
    /// An array position.
    Index(usize),
}

/// Location of a value inside a metadata document.
///
/// Paths are cheap to extend: [`FieldPath::key`] and [`FieldPath::index`]
/// return a new path and leave the parent untouched, so a decoder can hand
/// the same parent to every child without cloning bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Child path for an object member.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.into()));
        Self { segments }
    }

    /// Child path for an array position.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// Extend this path in place.
    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Returns true for the document root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Last segment, if any.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }
}

fn needs_quoting(key: &str) -> bool {
    key.is_empty() || key.contains(['.', '[', ']', '"'])
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("(root)");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Index(n) => write!(f, "[{n}]")?,
                PathSegment::Key(k) if needs_quoting(k) => {
                    write!(f, "[\"{}\"]", k.replace('"', "\\\""))?
                }
                PathSegment::Key(k) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(k)?;
                }
            }
        }
        Ok(())
    }
}
