//! Structural diagnostics.

use std::fmt::{self, Display};

use stillwater::prelude::*;
use stillwater::Validation;

use crate::path::JsonPath;

/// One place where a document disagrees with the shape it was checked against.
///
/// # Example
///
/// ```rust
/// use hflav_fair::{JsonPath, Mismatch};
///
/// let mismatch = Mismatch::type_mismatch(JsonPath::root().push_field("doi"), "string", "integer");
///
/// assert_eq!(mismatch.code, "invalid_type");
/// assert_eq!(mismatch.to_string(), "doi: expected string, got integer");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// Where in the document the problem is.
    pub path: JsonPath,
    /// Human-readable description.
    pub message: String,
    /// The kind (or other description) that was declared.
    pub expected: Option<String>,
    /// The kind that was actually found.
    pub got: Option<String>,
    /// Machine-readable code: `invalid_type`, `required`, `malformed`.
    pub code: String,
}

impl Mismatch {
    pub fn new(path: JsonPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            expected: None,
            got: None,
            code: "invalid_type".to_string(),
        }
    }

    /// A value of the wrong kind at `path`.
    pub fn type_mismatch(
        path: JsonPath,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        let expected = expected.into();
        let got = got.into();
        Self::new(path, format!("expected {}, got {}", expected, got))
            .with_expected(expected)
            .with_got(got)
    }

    /// A declared-required property that the document does not contain.
    pub fn missing(path: JsonPath, name: &str) -> Self {
        Self::new(path, format!("required field '{}' is missing", name))
            .with_code("required")
            .with_expected("value")
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn with_got(mut self, got: impl Into<String>) -> Self {
        self.got = Some(got.into());
        self
    }
}

impl Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path_str = if self.path.is_root() {
            "(root)".to_string()
        } else {
            self.path.to_string()
        };

        write!(f, "{}: {}", path_str, self.message)
    }
}

impl std::error::Error for Mismatch {}

/// A non-empty list of [`Mismatch`] diagnostics.
///
/// Implements stillwater's `Semigroup`, so diagnostics from sibling fields can
/// be combined while walking a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatches(NonEmptyVec<Mismatch>);

impl Mismatches {
    pub fn single(mismatch: Mismatch) -> Self {
        Self(NonEmptyVec::singleton(mismatch))
    }

    /// Returns `None` when `mismatches` is empty.
    pub fn try_from_vec(mismatches: Vec<Mismatch>) -> Option<Self> {
        NonEmptyVec::from_vec(mismatches).map(Self)
    }

    /// Succeeds with `value` when nothing was collected, fails otherwise.
    pub fn into_validation<T>(value: T, collected: Vec<Mismatch>) -> Validation<T, Self> {
        match Self::try_from_vec(collected) {
            Some(mismatches) => Validation::Failure(mismatches),
            None => Validation::Success(value),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mismatch> {
        self.0.iter()
    }

    pub fn first(&self) -> &Mismatch {
        self.0.head()
    }

    /// Diagnostics reported exactly at `path`.
    pub fn at_path(&self, path: &JsonPath) -> Vec<&Mismatch> {
        self.0.iter().filter(|m| &m.path == path).collect()
    }

    /// Diagnostics with the given code.
    pub fn with_code(&self, code: &str) -> Vec<&Mismatch> {
        self.0.iter().filter(|m| m.code == code).collect()
    }

    /// Rendered paths in report order, handy for assertions and log lines.
    pub fn paths(&self) -> Vec<String> {
        self.0.iter().map(|m| m.path.to_string()).collect()
    }

    pub fn into_vec(self) -> Vec<Mismatch> {
        self.0.into_vec()
    }
}

impl Semigroup for Mismatches {
    fn combine(self, other: Self) -> Self {
        Mismatches(self.0.combine(other.0))
    }
}

impl Display for Mismatches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} mismatch(es):", self.len())?;
        for (i, mismatch) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, mismatch)?;
        }
        Ok(())
    }
}

impl std::error::Error for Mismatches {}

impl IntoIterator for Mismatches {
    type Item = Mismatch;
    type IntoIter = std::vec::IntoIter<Mismatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Mismatches>();
    assert_sync::<Mismatches>();
};
