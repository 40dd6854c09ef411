//! Dotted field paths for validation failures

use std::fmt;

/// Location of a value inside a raw argument object
///
/// Rendered as a dotted path: `location.city` for a nested field,
/// `stops.2` for the third element of a sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// The path of the argument object itself
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of a named child
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    /// Path of a sequence element
    pub fn index(&self, index: usize) -> Self {
        self.child(index.to_string())
    }

    /// Path segments, outermost first
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The top-level parameter this path belongs to, if any
    pub fn parameter(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "<arguments>");
        }
        write!(f, "{}", self.segments.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_path() {
        let path = FieldPath::root().child("trip").child("stops").index(2);
        assert_eq!(path.to_string(), "trip.stops.2");
        assert_eq!(path.parameter(), Some("trip"));
        assert_eq!(path.segments().len(), 3);
    }

    #[test]
    fn test_root_path() {
        let root = FieldPath::root();
        assert!(root.is_root());
        assert_eq!(root.parameter(), None);
        assert_eq!(root.to_string(), "<arguments>");
    }
}
