//! Runtime settings.
//!
//! Settings come from defaults, `HFLAV_*` environment variables, or a TOML
//! file. Nothing is global: callers load a [`Settings`] and pass it to
//! [`HandlerChain::from_settings`](crate::HandlerChain::from_settings) or
//! [`ModelBuilder::from_settings`](crate::ModelBuilder::from_settings).
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `HFLAV_MODEL_NAME` | `model_name` | `Model` |
//! | `HFLAV_STRICT_REQUIRED` | `strict_required` | `false` |
//! | `HFLAV_DESCRIPTOR_CACHE` | `descriptor_cache` | `true` |
//! | `HFLAV_SCHEMA_DIALECT` | `schema_dialect` | draft-07 |
//! | `HFLAV_LOG` | `log_filter` | `info` |
//! | `HFLAV_DOWNLOAD_DIR` | `download_dir` | current directory |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConversionError;
use crate::schema::SchemaDialect;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name given to root descriptors.
    pub model_name: String,
    /// Honor the schema's `required` list when materializing.
    pub strict_required: bool,
    /// Memoize descriptors across conversions.
    pub descriptor_cache: bool,
    /// Dialect marker put on inferred schemas.
    pub schema_dialect: SchemaDialect,
    /// `tracing` filter directive, e.g. `hflav_fair=debug`.
    pub log_filter: String,
    pub download_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_name: "Model".to_string(),
            strict_required: false,
            descriptor_cache: true,
            schema_dialect: SchemaDialect::default(),
            log_filter: "info".to_string(),
            download_dir: None,
        }
    }
}

impl Settings {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConversionError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    ///
    /// ```rust
    /// use hflav_fair::Settings;
    ///
    /// let settings = Settings::from_lookup(|key| match key {
    ///     "HFLAV_STRICT_REQUIRED" => Some("yes".to_string()),
    ///     _ => None,
    /// }).unwrap();
    /// assert!(settings.strict_required);
    /// assert_eq!(settings.model_name, "Model");
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConversionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(name) = lookup("HFLAV_MODEL_NAME").filter(|v| !v.trim().is_empty()) {
            settings.model_name = name.trim().to_string();
        }
        if let Some(raw) = lookup("HFLAV_STRICT_REQUIRED") {
            settings.strict_required = parse_bool("HFLAV_STRICT_REQUIRED", &raw)?;
        }
        if let Some(raw) = lookup("HFLAV_DESCRIPTOR_CACHE") {
            settings.descriptor_cache = parse_bool("HFLAV_DESCRIPTOR_CACHE", &raw)?;
        }
        if let Some(raw) = lookup("HFLAV_SCHEMA_DIALECT") {
            settings.schema_dialect = SchemaDialect::from(raw.trim().to_string());
        }
        if let Some(filter) = lookup("HFLAV_LOG") {
            settings.log_filter = filter;
        }
        if let Some(dir) = lookup("HFLAV_DOWNLOAD_DIR").filter(|v| !v.is_empty()) {
            settings.download_dir = Some(PathBuf::from(dir));
        }
        Ok(settings)
    }

    /// Parses TOML; absent keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConversionError> {
        toml::from_str(text).map_err(|e| ConversionError::Config(e.to_string()))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConversionError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConversionError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Where downloads go when the caller names no destination.
    pub fn download_path(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConversionError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConversionError::Config(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}
