use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::trace;

use crate::error::ConversionError;

use super::Source;

/// A [`Source`] backed by a directory tree.
///
/// Layout: `<root>/<record_id>/record.json` holds the record metadata and
/// `<root>/<record_id>/<filename>` each file.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, record_id: u64, filename: &str) -> Result<PathBuf, ConversionError> {
        let plain = Path::new(filename)
            .file_name()
            .is_some_and(|name| name == filename);
        if !plain {
            return Err(ConversionError::access(
                format!("record {} file '{}'", record_id, filename),
                "file names may not contain path separators",
            ));
        }
        Ok(self.root.join(record_id.to_string()).join(filename))
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, ConversionError> {
        trace!(path = %path.display(), "reading local file");
        std::fs::read(path).map_err(|e| {
            let resource = path.display().to_string();
            match e.kind() {
                ErrorKind::NotFound => ConversionError::DataNotFound { resource },
                _ => ConversionError::access(resource, e),
            }
        })
    }
}

impl Source for LocalSource {
    fn fetch_file_bytes(&self, record_id: u64, filename: &str) -> Result<Vec<u8>, ConversionError> {
        let path = self.locate(record_id, filename)?;
        self.read(&path)
    }

    fn fetch_record_json(&self, record_id: u64) -> Result<Value, ConversionError> {
        let path = self.locate(record_id, "record.json")?;
        let bytes = self.read(&path)?;
        crate::json::parse(&bytes, path.display().to_string())
    }
}
