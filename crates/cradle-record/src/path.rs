//! Field paths for addressing values inside profile records
//!
//! Provides [`FieldPath`] for hierarchical addressing of values within a
//! [`ProfileRecord`](crate::ProfileRecord).

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Path within a profile record
///
/// Segments are raw keys, so display-label keys with spaces
/// (`formData.Education Level`) are valid. Only `.` is reserved.
///
/// # Examples
/// - `["about", "bio"]` → `about.bio`
/// - `["form2Data", "fertility", "clinic"]` → `form2Data.fertility.clinic`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Create path from a single top-level key
    #[inline]
    #[must_use]
    pub fn single(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// Create path from borrowed segments
    #[must_use]
    pub fn of(segments: &[&str]) -> Self {
        Self(segments.iter().map(|s| (*s).to_string()).collect())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path has no segments
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Nesting depth below the top-level key (`bio` is 0, `about.bio` is 1)
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Get first segment, the top-level record key
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Get last segment
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }

        let segments: Vec<String> = s
            .split('.')
            .map(|seg| {
                if seg.trim().is_empty() {
                    Err(PathError::EmptySegment(s.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

/// Errors related to field paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// No segments at all
    #[error("field path is empty")]
    Empty,

    /// Empty segment in path
    #[error("field path '{0}' contains an empty segment")]
    EmptySegment(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_of_and_segments() {
        let path = FieldPath::of(&["formData", "city"]);
        assert_eq!(path.segments(), &["formData", "city"]);
        assert_eq!(path.len(), 2);
        assert_eq!(path.depth(), 1);
    }

    #[test]
    fn path_single_has_depth_zero() {
        let path = FieldPath::single("bio");
        assert_eq!(path.depth(), 0);
        assert_eq!(path.first(), Some("bio"));
        assert_eq!(path.last(), Some("bio"));
    }

    #[test]
    fn path_from_str_keeps_display_labels() {
        let path: FieldPath = "formData.Education Level".parse().unwrap();
        assert_eq!(path.last(), Some("Education Level"));
    }

    #[test]
    fn path_from_str_empty() {
        let result: Result<FieldPath, _> = "".parse();
        assert_eq!(result, Err(PathError::Empty));
    }

    #[test]
    fn path_from_str_empty_segment() {
        let result: Result<FieldPath, _> = "a..b".parse();
        assert!(matches!(result, Err(PathError::EmptySegment(_))));

        let trailing: Result<FieldPath, _> = "form2Data.".parse();
        assert!(matches!(trailing, Err(PathError::EmptySegment(_))));
    }

    #[test]
    fn path_display_joins_segments() {
        let path = FieldPath::of(&["form2Data", "fertility"]);
        assert_eq!(path.to_string(), "form2Data.fertility");
        assert_eq!(path.to_string().parse::<FieldPath>().unwrap(), path);
    }

    #[test]
    fn path_iter() {
        let path = FieldPath::of(&["a", "b"]);
        let collected: Vec<_> = path.iter().collect();
        assert_eq!(collected, vec!["a", "b"]);
    }
}
