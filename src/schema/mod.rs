//! Structural schemas.
//!
//! A [`Schema`] describes the shape of a JSON document: which kinds a node
//! admits, the properties of object nodes, which of those are required, and
//! the item shape of array nodes. Schemas come from two places: the
//! [inference engine](crate::infer) or an explicit JSON-Schema file read with
//! [`Schema::from_json_schema`]. Once built they are never mutated.
//!
//! # Example
//!
//! ```rust
//! use hflav_fair::{infer, Kind};
//! use serde_json::json;
//!
//! let schema = infer(&json!({"title": "x", "measurements": []})).unwrap();
//!
//! assert!(schema.is_required("title"));
//! assert!(schema.property("title").unwrap().kinds().contains(Kind::String));
//! assert!(schema.property("measurements").unwrap().items().is_none());
//! ```

mod dialect;
mod json_schema;
mod kind;

pub use dialect::SchemaDialect;
pub use json_schema::ToJsonSchema;
pub use kind::{Kind, KindSet};

use indexmap::{IndexMap, IndexSet};
use sha2::{Digest, Sha256};

use crate::error::ConversionError;

/// A recursive structural description of a JSON document.
///
/// Invariant: every name in `required` is a key of `properties`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    kinds: KindSet,
    properties: IndexMap<String, Schema>,
    required: IndexSet<String>,
    items: Option<Box<Schema>>,
    dialect: Option<SchemaDialect>,
}

impl Schema {
    /// A schema that admits any value.
    pub fn any() -> Self {
        Self::default()
    }

    /// A schema admitting exactly one primitive kind.
    pub fn of_kind(kind: Kind) -> Self {
        Self {
            kinds: KindSet::single(kind),
            ..Self::default()
        }
    }

    /// An object schema.
    ///
    /// Fails with `SchemaBuild` if a required name is not a declared property.
    pub fn object(
        properties: IndexMap<String, Schema>,
        required: impl IntoIterator<Item = String>,
    ) -> Result<Self, ConversionError> {
        let required: IndexSet<String> = required.into_iter().collect();
        if let Some(undeclared) = required.iter().find(|name| !properties.contains_key(*name)) {
            return Err(ConversionError::schema_build(
                "schema",
                format!("required property '{}' is not declared", undeclared),
            ));
        }
        Ok(Self {
            kinds: KindSet::single(Kind::Object),
            properties,
            required,
            ..Self::default()
        })
    }

    /// An array schema; `None` leaves the items unconstrained.
    pub fn array(items: Option<Schema>) -> Self {
        Self {
            kinds: KindSet::single(Kind::Array),
            items: items.map(Box::new),
            ..Self::default()
        }
    }

    /// Assembles a node whose invariant the caller already upholds.
    pub(crate) fn from_parts(
        kinds: KindSet,
        properties: IndexMap<String, Schema>,
        required: IndexSet<String>,
        items: Option<Schema>,
    ) -> Self {
        debug_assert!(required.iter().all(|name| properties.contains_key(name)));
        Self {
            kinds,
            properties,
            required,
            items: items.map(Box::new),
            dialect: None,
        }
    }

    /// Attaches a dialect marker. Informational only.
    pub fn with_dialect(mut self, dialect: SchemaDialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    pub fn kinds(&self) -> &KindSet {
        &self.kinds
    }

    pub fn properties(&self) -> &IndexMap<String, Schema> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties.get(name)
    }

    pub fn required(&self) -> &IndexSet<String> {
        &self.required
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    pub fn items(&self) -> Option<&Schema> {
        self.items.as_deref()
    }

    pub fn dialect(&self) -> Option<&SchemaDialect> {
        self.dialect.as_ref()
    }

    /// Whether this node can describe an object.
    pub fn is_object_like(&self) -> bool {
        self.kinds.contains(Kind::Object) || (self.kinds.is_any() && !self.properties.is_empty())
    }

    /// A SHA-256 content hash of the structure, in property declaration order.
    ///
    /// Two schemas with equal fingerprints build identical descriptors, which
    /// makes this the key of the [`DescriptorCache`](crate::DescriptorCache).
    /// The dialect marker does not contribute.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        self.feed(&mut hasher);
        format!("{:x}", hasher.finalize())
    }

    fn feed(&self, hasher: &mut Sha256) {
        hasher.update(b"k:");
        hasher.update(self.kinds.to_string().as_bytes());
        for (name, property) in &self.properties {
            hasher.update(b";p:");
            hasher.update((name.len() as u64).to_le_bytes());
            hasher.update(name.as_bytes());
            hasher.update([u8::from(self.required.contains(name))]);
            hasher.update(b"{");
            property.feed(hasher);
            hasher.update(b"}");
        }
        if let Some(items) = &self.items {
            hasher.update(b";i:[");
            items.feed(hasher);
            hasher.update(b"]");
        }
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Schema>();
    assert_sync::<Schema>();
};
