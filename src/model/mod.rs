//! Dynamic models.
//!
//! A [`TypeDescriptor`] is the data-driven stand-in for a generated record
//! type: an ordered map from property name to [`FieldSpec`]. It is built once
//! per schema by the [`ModelBuilder`] and then interpreted by the
//! [`Materializer`](crate::Materializer) for any number of documents.

mod builder;
mod ident;

pub use builder::{ModelBuilder, Optionality};

use std::fmt::{self, Display};
use std::sync::Arc;

use indexmap::IndexMap;

/// The semantic type of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Text,
    Integer,
    Float,
    Boolean,
    /// An ordered sequence; `None` leaves the element type unconstrained.
    Sequence(Option<Box<FieldType>>),
    /// A nested record with its own descriptor.
    Record(Arc<TypeDescriptor>),
    /// Untyped fallback; the value is kept as-is.
    Any,
}

impl FieldType {
    pub fn is_record(&self) -> bool {
        matches!(self, FieldType::Record(_))
    }

    /// The nested descriptor of a record, or of a sequence of records.
    pub fn descriptor(&self) -> Option<&Arc<TypeDescriptor>> {
        match self {
            FieldType::Record(descriptor) => Some(descriptor),
            FieldType::Sequence(Some(element)) => element.descriptor(),
            _ => None,
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Text => f.write_str("text"),
            FieldType::Integer => f.write_str("integer"),
            FieldType::Float => f.write_str("float"),
            FieldType::Boolean => f.write_str("boolean"),
            FieldType::Sequence(None) => f.write_str("sequence<any>"),
            FieldType::Sequence(Some(element)) => write!(f, "sequence<{}>", element),
            FieldType::Record(descriptor) => write!(f, "record<{}>", descriptor.name()),
            FieldType::Any => f.write_str("any"),
        }
    }
}

/// One declared field of a [`TypeDescriptor`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// The exact key in the JSON document.
    pub name: String,
    /// The escaped identifier the field is also reachable under.
    pub accessor: String,
    pub ty: FieldType,
    /// Whether the field may be absent from a document.
    pub optional: bool,
}

/// A named, reusable record shape.
///
/// Immutable once built; share it through an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    name: String,
    fields: IndexMap<String, FieldSpec>,
}

impl TypeDescriptor {
    pub(crate) fn new(name: String, fields: IndexMap<String, FieldSpec>) -> Self {
        Self { name, fields }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Looks a field up by its JSON key first, then by its accessor.
    pub fn resolve(&self, name_or_accessor: &str) -> Option<&FieldSpec> {
        self.fields
            .get(name_or_accessor)
            .or_else(|| self.fields.values().find(|f| f.accessor == name_or_accessor))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names mapped to their type, for comparisons and printing.
    pub fn signature(&self) -> Vec<(&str, String, bool)> {
        self.fields
            .values()
            .map(|f| (f.name.as_str(), f.ty.to_string(), f.optional))
            .collect()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<TypeDescriptor>();
    assert_sync::<TypeDescriptor>();
};
