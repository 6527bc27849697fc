//! Locations inside JSON documents and materialized instances.
//!
//! [`JsonPath`] is shared by the validator (to report where a mismatch was
//! found) and by [`Instance::lookup`](crate::Instance::lookup) (to navigate a
//! materialized object graph with expressions like `measurements[0].name`).

use std::fmt::{self, Display};

/// One step of a [`JsonPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object property access by exact key.
    Field(String),
    /// Array element access by position.
    Index(usize),
}

/// A path from the document root to a nested value.
///
/// Paths are immutable; `push_*` returns a new path so a parent path can be
/// shared between sibling branches during recursive descent.
///
/// # Example
///
/// ```rust
/// use hflav_fair::JsonPath;
///
/// let path = JsonPath::root()
///     .push_field("measurements")
///     .push_index(0)
///     .push_field("average");
///
/// assert_eq!(path.to_string(), "measurements[0].average");
/// assert_eq!(path.to_pointer(), "/measurements/0/average");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    /// The empty path, addressing the document itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path with a property segment appended.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Field(name.into()));
        Self { segments }
    }

    /// Returns a new path with an index segment appended.
    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Parses the dotted form produced by `Display`.
    ///
    /// Returns `None` for malformed input such as an unterminated bracket,
    /// a non-numeric index or an empty field name.
    ///
    /// ```rust
    /// use hflav_fair::{JsonPath, PathSegment};
    ///
    /// let path = JsonPath::parse("measurements[0].inputs[12].name").unwrap();
    /// assert_eq!(path.len(), 5);
    /// assert_eq!(path.last(), Some(&PathSegment::Field("name".into())));
    /// assert!(JsonPath::parse("measurements[x]").is_none());
    /// ```
    pub fn parse(expression: &str) -> Option<Self> {
        let mut segments = Vec::new();
        if expression.is_empty() {
            return Some(Self { segments });
        }

        for part in expression.split('.') {
            let (field, mut rest) = match part.find('[') {
                Some(pos) => (&part[..pos], &part[pos..]),
                None => (part, ""),
            };
            if (field.is_empty() && rest.is_empty()) || field.contains(']') {
                return None;
            }
            if !field.is_empty() {
                segments.push(PathSegment::Field(field.to_string()));
            }
            while !rest.is_empty() {
                let close = rest.find(']')?;
                if !rest.starts_with('[') {
                    return None;
                }
                let index = rest[1..close].parse::<usize>().ok()?;
                segments.push(PathSegment::Index(index));
                rest = &rest[close + 1..];
            }
        }

        Some(Self { segments })
    }

    /// Renders the path as an RFC 6901 JSON Pointer.
    ///
    /// This is the form external JSON-Schema validators report instance
    /// locations in, so diagnostics can be compared across tools.
    pub fn to_pointer(&self) -> String {
        let mut pointer = String::new();
        for segment in &self.segments {
            pointer.push('/');
            match segment {
                PathSegment::Field(name) => {
                    pointer.push_str(&name.replace('~', "~0").replace('/', "~1"))
                }
                PathSegment::Index(idx) => pointer.push_str(&idx.to_string()),
            }
        }
        pointer
    }
}

impl Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_renders_empty() {
        let path = JsonPath::root();
        assert!(path.is_root());
        assert_eq!(path.to_string(), "");
        assert_eq!(path.to_pointer(), "");
    }

    #[test]
    fn test_nested_measurement_path() {
        let path = JsonPath::root()
            .push_field("measurements")
            .push_index(0)
            .push_field("inputs")
            .push_index(3)
            .push_field("References");
        assert_eq!(path.to_string(), "measurements[0].inputs[3].References");
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn test_matrix_indices() {
        let path = JsonPath::root()
            .push_field("averages_correlation")
            .push_index(1)
            .push_index(0);
        assert_eq!(path.to_string(), "averages_correlation[1][0]");
        assert_eq!(path.to_pointer(), "/averages_correlation/1/0");
    }

    #[test]
    fn test_sibling_paths_share_parent() {
        let base = JsonPath::root().push_field("inputs");
        let first = base.push_index(0);
        let second = base.push_index(1);
        assert_eq!(base.to_string(), "inputs");
        assert_eq!(first.to_string(), "inputs[0]");
        assert_eq!(second.to_string(), "inputs[1]");
    }

    #[test]
    fn test_pointer_escapes_special_characters() {
        let path = JsonPath::root().push_field("J/psi K~S");
        assert_eq!(path.to_pointer(), "/J~1psi K~0S");
    }

    #[test]
    fn test_parse_round_trips_display() {
        for expr in ["title", "a.b.c", "m[0].inputs[2].value", "grid[1][0]", "[3]"] {
            let path = JsonPath::parse(expr).unwrap();
            assert_eq!(path.to_string(), expr);
        }
    }

    #[test]
    fn test_parse_empty_is_root() {
        assert!(JsonPath::parse("").unwrap().is_root());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(JsonPath::parse("a[").is_none());
        assert!(JsonPath::parse("a[one]").is_none());
        assert!(JsonPath::parse("a..b").is_none());
        assert!(JsonPath::parse("a]").is_none());
    }
}
