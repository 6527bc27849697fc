//! The `$schema` marker.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which JSON-Schema dialect a schema claims to follow.
///
/// Only carried through for interoperability with external validators; none
/// of the checks in this crate change behavior based on it. Serializes as the
/// dialect URI.
///
/// ```rust
/// use hflav_fair::SchemaDialect;
///
/// let dialect: SchemaDialect = serde_json::from_str(
///     r#""http://json-schema.org/draft-07/schema#""#,
/// ).unwrap();
/// assert_eq!(dialect, SchemaDialect::Draft07);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SchemaDialect {
    #[default]
    Draft07,
    Draft201909,
    Draft202012,
    Other(String),
}

const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";
const DRAFT_2019_09: &str = "https://json-schema.org/draft/2019-09/schema";
const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

impl SchemaDialect {
    pub fn uri(&self) -> &str {
        match self {
            Self::Draft07 => DRAFT_07,
            Self::Draft201909 => DRAFT_2019_09,
            Self::Draft202012 => DRAFT_2020_12,
            Self::Other(uri) => uri,
        }
    }
}

impl From<String> for SchemaDialect {
    fn from(uri: String) -> Self {
        // Tolerate the missing trailing '#' and http/https variants.
        let normalized = uri.trim_end_matches('#').replacen("https://", "http://", 1);
        match normalized.as_str() {
            "http://json-schema.org/draft-07/schema" | "draft-07" => Self::Draft07,
            "http://json-schema.org/draft/2019-09/schema" | "2019-09" => Self::Draft201909,
            "http://json-schema.org/draft/2020-12/schema" | "2020-12" => Self::Draft202012,
            _ => Self::Other(uri),
        }
    }
}

impl From<SchemaDialect> for String {
    fn from(dialect: SchemaDialect) -> Self {
        dialect.uri().to_string()
    }
}

impl FromStr for SchemaDialect {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

impl Display for SchemaDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri())
    }
}
