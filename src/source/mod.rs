//! Collaborators that supply records, files and schemas.
//!
//! The pipeline never talks to Zenodo or GitLab directly. It goes through
//! [`Source`] and [`SchemaRepository`], so tests and offline runs can swap in
//! [`LocalSource`] or an in-memory fake.

mod local;

pub use local::LocalSource;

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::config::Settings;
use crate::error::ConversionError;
use crate::models::{Record, Template};

/// Access to records and their files.
pub trait Source: Send + Sync {
    /// The raw bytes of one file of a record.
    ///
    /// # Errors
    ///
    /// `DataNotFound` when the record or file does not exist, `DataAccess`
    /// when it exists but cannot be read.
    fn fetch_file_bytes(&self, record_id: u64, filename: &str) -> Result<Vec<u8>, ConversionError>;

    /// The record's metadata as the API returns it.
    fn fetch_record_json(&self, record_id: u64) -> Result<Value, ConversionError>;

    fn fetch_record(&self, record_id: u64) -> Result<Record, ConversionError> {
        Record::from_json(self.fetch_record_json(record_id)?)
    }

    fn fetch_template(&self, record_id: u64) -> Result<Template, ConversionError> {
        Template::from_json(self.fetch_record_json(record_id)?)
    }

    /// A file of a record, parsed as JSON.
    fn fetch_json(&self, record_id: u64, filename: &str) -> Result<Value, ConversionError> {
        let bytes = self.fetch_file_bytes(record_id, filename)?;
        crate::json::parse(&bytes, format!("record {} file '{}'", record_id, filename))
    }
}

/// Versioned schemas, addressed by tag.
pub trait SchemaRepository: Send + Sync {
    /// The JSON-Schema document published at `tag`.
    ///
    /// # Errors
    ///
    /// `DataNotFound` for an unknown tag, `MalformedInput` when the stored
    /// schema is not JSON.
    fn fetch_schema_at_tag(&self, tag: &str) -> Result<Value, ConversionError>;
}

/// Downloads one file of a record to `dest`.
///
/// If `dest` is an existing directory the file keeps its name inside it;
/// otherwise `dest` is the target file path. Returns the path written.
pub fn save_file(
    source: &dyn Source,
    record_id: u64,
    filename: &str,
    dest: &Path,
) -> Result<PathBuf, ConversionError> {
    let bytes = source.fetch_file_bytes(record_id, filename)?;
    let target = if dest.is_dir() {
        dest.join(filename)
    } else {
        dest.to_path_buf()
    };
    std::fs::write(&target, &bytes)
        .map_err(|e| ConversionError::access(target.display().to_string(), e))?;
    info!(record_id, file = filename, path = %target.display(), bytes = bytes.len(), "saved file");
    Ok(target)
}

/// Downloads one file of a record into the configured download directory,
/// creating the directory if needed.
pub fn download(
    source: &dyn Source,
    settings: &Settings,
    record_id: u64,
    filename: &str,
) -> Result<PathBuf, ConversionError> {
    let dir = settings.download_path();
    std::fs::create_dir_all(&dir)
        .map_err(|e| ConversionError::access(dir.display().to_string(), e))?;
    save_file(source, record_id, filename, &dir)
}
