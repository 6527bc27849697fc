//! Zenodo records, templates and file references.
//!
//! These are read from the JSON the Zenodo records API returns. Only the
//! fields the conversion pipeline uses are kept.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConversionError;

/// A downloadable file attached to a record.
///
/// Read from `{"key": ..., "links": {"self": ...}}`; `links.download` is
/// used when `self` is absent, and missing values become empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawFile")]
pub struct FileRef {
    pub name: String,
    pub download_url: String,
}

impl FileRef {
    pub fn new(name: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            download_url: download_url.into(),
        }
    }

    pub fn has_extension(&self, extension: &str) -> bool {
        self.name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(extension))
    }
}

#[derive(Deserialize)]
struct RawFile {
    #[serde(default)]
    key: String,
    #[serde(default)]
    links: Map<String, Value>,
}

impl From<RawFile> for FileRef {
    fn from(raw: RawFile) -> Self {
        let download_url = ["self", "download"]
            .iter()
            .find_map(|link| raw.links.get(*link).and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();
        FileRef {
            name: raw.key,
            download_url,
        }
    }
}

#[derive(Deserialize, Default)]
struct RawMetadata {
    #[serde(default)]
    title: String,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Deserialize)]
struct RawRecord {
    id: u64,
    #[serde(default)]
    doi: String,
    created: String,
    updated: String,
    #[serde(default)]
    links: Map<String, Value>,
    #[serde(default)]
    metadata: RawMetadata,
    #[serde(default)]
    files: Vec<FileRef>,
}

/// A data record: an HFLAV publication with its files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRecord")]
pub struct Record {
    pub id: u64,
    pub doi: String,
    pub title: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub links: Map<String, Value>,
    pub files: Vec<FileRef>,
}

impl TryFrom<RawRecord> for Record {
    type Error = ConversionError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        Ok(Record {
            id: raw.id,
            doi: raw.doi,
            title: raw.metadata.title,
            created: parse_timestamp(&raw.created)?,
            updated: parse_timestamp(&raw.updated)?,
            links: raw.links,
            files: raw.files,
        })
    }
}

impl Record {
    /// Reads a record from Zenodo API JSON.
    pub fn from_json(value: Value) -> Result<Self, ConversionError> {
        serde_json::from_value(value).map_err(|e| ConversionError::malformed("zenodo record", e))
    }

    pub fn file(&self, name: &str) -> Option<&FileRef> {
        self.files.iter().find(|f| f.name == name)
    }

    pub fn add_file(&mut self, file: FileRef) {
        self.files.push(file);
    }

    /// Removes every file called `name`; a no-op when there is none.
    pub fn remove_file(&mut self, name: &str) {
        self.files.retain(|f| f.name != name);
    }
}

/// A template record: the sample document and/or explicit schema that
/// describe one family of data records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRecord")]
pub struct Template {
    pub rec_id: u64,
    pub title: String,
    /// Doubles as the schema repository tag.
    pub version: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    /// The first `*.json` file.
    pub json_template: Option<FileRef>,
    /// The first `*.schema` file.
    pub json_schema: Option<FileRef>,
}

impl TryFrom<RawRecord> for Template {
    type Error = ConversionError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let json_template = raw.files.iter().find(|f| f.has_extension("json")).cloned();
        let json_schema = raw.files.iter().find(|f| f.has_extension("schema")).cloned();
        Ok(Template {
            rec_id: raw.id,
            title: raw.metadata.title,
            version: raw.metadata.version.filter(|v| !v.is_empty()),
            created: parse_timestamp(&raw.created)?,
            updated: parse_timestamp(&raw.updated)?,
            json_template,
            json_schema,
        })
    }
}

impl Template {
    /// Reads a template from Zenodo API JSON.
    pub fn from_json(value: Value) -> Result<Self, ConversionError> {
        serde_json::from_value(value).map_err(|e| ConversionError::malformed("zenodo template", e))
    }
}

/// The newest template created at or before `at`.
///
/// Data records are converted with the template that was current when they
/// were published.
pub fn select_template(templates: &[Template], at: DateTime<Utc>) -> Option<&Template> {
    templates
        .iter()
        .filter(|t| t.created <= at)
        .max_by_key(|t| t.created)
}

/// Accepts RFC 3339 and offset-less `YYYY-MM-DDTHH:MM:SS[.f]`, the latter
/// read as UTC.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, ConversionError> {
    if let Ok(stamped) = DateTime::parse_from_rfc3339(text) {
        return Ok(stamped.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| ConversionError::malformed("timestamp", format!("'{}': {}", text, e)))
}
