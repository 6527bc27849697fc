//! Presentation of schemas and instances.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

use crate::error::ConversionError;
use crate::instance::Instance;

/// Something that shows schemas and instances to a user.
pub trait Visualizer {
    fn render_schema(&mut self, schema: &Value) -> Result<(), ConversionError>;

    fn render_instance(&mut self, instance: &Instance) -> Result<(), ConversionError>;
}

/// Writes indented JSON, one document per call, to any writer.
///
/// ```rust
/// use hflav_fair::{PrettyJsonVisualizer, Visualizer};
/// use serde_json::json;
///
/// let mut visualizer = PrettyJsonVisualizer::new(Vec::new());
/// visualizer.render_schema(&json!({"type": "object"})).unwrap();
/// let out = String::from_utf8(visualizer.into_inner()).unwrap();
/// assert_eq!(out, "{\n    \"type\": \"object\"\n}\n");
/// ```
pub struct PrettyJsonVisualizer<W: Write> {
    out: W,
}

impl PrettyJsonVisualizer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> PrettyJsonVisualizer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), ConversionError> {
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut self.out, formatter);
        value
            .serialize(&mut serializer)
            .map_err(|e| ConversionError::access("output", e))?;
        writeln!(self.out).map_err(|e| ConversionError::access("output", e))
    }
}

impl<W: Write> Visualizer for PrettyJsonVisualizer<W> {
    fn render_schema(&mut self, schema: &Value) -> Result<(), ConversionError> {
        self.write(schema)
    }

    fn render_instance(&mut self, instance: &Instance) -> Result<(), ConversionError> {
        self.write(instance)
    }
}
