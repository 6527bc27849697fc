//! JSON value kinds and sets of kinds.

use std::collections::BTreeSet;
use std::fmt::{self, Display};

use serde_json::Value;

/// The primitive kind of a JSON value, as JSON Schema names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl Kind {
    /// Classifies a value. Numbers without a fractional representation
    /// (`serde_json` parsed them as `i64`/`u64`) are `Integer`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Kind::Integer,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::Array => "array",
            Kind::Object => "object",
        }
    }

    /// Parses a JSON Schema `type` name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "null" => Some(Kind::Null),
            "boolean" => Some(Kind::Boolean),
            "integer" => Some(Kind::Integer),
            "number" => Some(Kind::Number),
            "string" => Some(Kind::String),
            "array" => Some(Kind::Array),
            "object" => Some(Kind::Object),
            _ => None,
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of kinds a schema node admits. The empty set means "any".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct KindSet(BTreeSet<Kind>);

impl KindSet {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn single(kind: Kind) -> Self {
        Self(BTreeSet::from([kind]))
    }

    pub fn is_any(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, kind: Kind) -> bool {
        self.0.contains(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = Kind> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn insert(&mut self, kind: Kind) {
        self.0.insert(kind);
    }

    /// Union with `other`. A set that saw both `integer` and `number`
    /// keeps only `number`, since every integer is a number.
    pub(crate) fn merge(&mut self, other: &KindSet) {
        self.0.extend(other.0.iter().copied());
        if self.0.contains(&Kind::Number) {
            self.0.remove(&Kind::Integer);
        }
    }

    /// Kinds other than `null`.
    pub fn without_null(&self) -> Vec<Kind> {
        self.0.iter().copied().filter(|k| *k != Kind::Null).collect()
    }

    /// Whether a value of kind `actual` satisfies this set.
    ///
    /// Integers satisfy `number`; nothing else is coerced.
    pub fn admits(&self, actual: Kind) -> bool {
        self.is_any()
            || self.0.contains(&actual)
            || (actual == Kind::Integer && self.0.contains(&Kind::Number))
    }
}

impl FromIterator<Kind> for KindSet {
    fn from_iter<I: IntoIterator<Item = Kind>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Display for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            return f.write_str("any");
        }
        let names: Vec<&str> = self.0.iter().map(|k| k.as_str()).collect();
        f.write_str(&names.join("|"))
    }
}
