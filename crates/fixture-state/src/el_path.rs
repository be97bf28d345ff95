//! Structural element paths
//!
//! Provides [`ElPath`] for addressing a decorated element inside a rendered
//! fixture tree.

use crate::error::PathError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Position of an element within a rendered tree
///
/// Recomputed on every render. Together with a [`DecoratorId`](crate::DecoratorId)
/// it re-locates the live instance after a re-render.
///
/// Segments are opaque: any non-empty text between dots.
///
/// # Examples
/// - `["children"]` → `children`
/// - `["children", "1", "children"]` → `children.1.children`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ElPath(Vec<String>);

impl ElPath {
    /// Path of the tree root
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Append a segment, returning new path
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    /// Append a positional index, returning new path
    #[inline]
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        self.child(index.to_string())
    }
}

impl Display for ElPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl FromStr for ElPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }

        let segments = s
            .split('.')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment)
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self(segments))
    }
}

impl TryFrom<String> for ElPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ElPath> for String {
    fn from(path: ElPath) -> Self {
        path.to_string()
    }
}
