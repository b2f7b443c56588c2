//! Field values, stored documents, and the index schema.
//!
//! Every field of an indexable document is one variant of [`FieldValue`].
//! Range filtering and ordinal comparison are implemented per variant, so the
//! query layer never needs to know which concrete record type a document came
//! from.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The value of a single document field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Free text, tokenized by the analyzer when the field is indexed.
    Text(String),
    /// Exact string, never tokenized. Compared by ordinal (byte-wise) order.
    Keyword(String),
    /// 32-bit integer.
    Integer(i32),
    /// 64-bit integer.
    Long(i64),
    /// 64-bit float.
    Double(f64),
}

impl FieldValue {
    /// Returns the string content of a `Text` or `Keyword` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Keyword(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value of an `Integer`.
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value of a `Long`, widening an `Integer`.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            FieldValue::Long(l) => Some(*l),
            FieldValue::Integer(i) => Some(i64::from(*i)),
            _ => None,
        }
    }

    /// Returns the value of a `Double`.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            FieldValue::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// The string form used for ordinal comparison.
    pub fn ordinal_form(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Text(s) | FieldValue::Keyword(s) => Cow::Borrowed(s),
            FieldValue::Integer(i) => Cow::Owned(i.to_string()),
            FieldValue::Long(l) => Cow::Owned(l.to_string()),
            FieldValue::Double(d) => Cow::Owned(d.to_string()),
        }
    }

    /// Compare two values of the same variant.
    ///
    /// Returns `None` for mismatched variants (except `Integer` vs `Long`,
    /// which compare numerically) and for NaN doubles.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b))
            | (FieldValue::Keyword(a), FieldValue::Keyword(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Double(a), FieldValue::Double(b)) => a.partial_cmp(b),
            (a, b) => match (a.as_long(), b.as_long()) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => None,
            },
        }
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Long(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Double(v)
    }
}

/// A document as handed to, and stored by, the index.
///
/// Field order is deterministic so that encoded segments are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub fields: BTreeMap<String, FieldValue>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::default()
    }

    /// Add a field, replacing any previous value under the same name.
    pub fn with_field<S: Into<String>, V: Into<FieldValue>>(mut self, name: S, value: V) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Text or keyword content of a field, or `""` when absent.
    pub fn text(&self, name: &str) -> &str {
        self.get(name).and_then(FieldValue::as_text).unwrap_or("")
    }
}

/// Fluent builder for [`Document`].
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    pub fn add_text<S: Into<String>, T: Into<String>>(mut self, name: S, value: T) -> Self {
        self.document
            .fields
            .insert(name.into(), FieldValue::Text(value.into()));
        self
    }

    pub fn add_keyword<S: Into<String>, T: Into<String>>(mut self, name: S, value: T) -> Self {
        self.document
            .fields
            .insert(name.into(), FieldValue::Keyword(value.into()));
        self
    }

    pub fn add_field<S: Into<String>>(mut self, name: S, value: FieldValue) -> Self {
        self.document.fields.insert(name.into(), value);
        self
    }

    pub fn build(self) -> Document {
        self.document
    }
}

/// How a single field is handled by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Analyze the field and add it to the inverted index (text fields only).
    pub indexed: bool,
    /// Keep the value so it can be filtered on and returned in hits.
    pub stored: bool,
}

impl FieldOption {
    pub const STORED: FieldOption = FieldOption {
        indexed: false,
        stored: true,
    };

    pub const INDEXED: FieldOption = FieldOption {
        indexed: true,
        stored: false,
    };
}

impl Default for FieldOption {
    fn default() -> Self {
        FieldOption::STORED
    }
}

/// Declares how each field is indexed and stored.
///
/// Fields not named in the schema are stored but not indexed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: BTreeMap<String, FieldOption>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn option(&self, field: &str) -> FieldOption {
        self.fields.get(field).copied().unwrap_or_default()
    }

    /// Names of fields that feed the inverted index.
    pub fn indexed_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, opt)| opt.indexed)
            .map(|(name, _)| name.as_str())
    }
}

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    fields: BTreeMap<String, FieldOption>,
}

impl SchemaBuilder {
    pub fn add_field(mut self, name: impl Into<String>, option: FieldOption) -> Self {
        self.fields.insert(name.into(), option);
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            fields: self.fields,
        }
    }
}
