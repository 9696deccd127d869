//! Schema metadata types and positional schema validation.
//!
//! A `Schema` is an ordered list of `(name, type)` pairs; order is
//! semantically significant because it defines the positional
//! correspondence to query result columns and to insertion literal order.
//! Column name uniqueness is assumed, not enforced.

use std::fmt;

use crate::error::{Error, Result};

/// Closed set of recognized column type classifications.
///
/// Every coercion and decoding rule in this crate is keyed off one of
/// these tags; type names outside the set map to `Unknown` and are
/// passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// `DateTime64(3)` - millisecond-precision timestamp.
    DateTime64Milli,
    /// `UInt32` - unsigned 32-bit integer.
    UInt32,
    /// `Nullable(UInt8)` - optional unsigned 8-bit integer.
    NullableUInt8,
    /// `Nullable(String)` - optional string.
    NullableString,
    /// `String` - non-nullable string.
    Str,
    /// Any type name not in the recognized set.
    Unknown,
}

impl TypeTag {
    /// Classify a ClickHouse type name.
    pub fn parse(type_name: &str) -> Self {
        match type_name.trim() {
            "DateTime64(3)" => TypeTag::DateTime64Milli,
            "UInt32" => TypeTag::UInt32,
            "Nullable(UInt8)" => TypeTag::NullableUInt8,
            "Nullable(String)" => TypeTag::NullableString,
            "String" => TypeTag::Str,
            _ => TypeTag::Unknown,
        }
    }

    /// Whether cells of this type may be NULL.
    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeTag::NullableUInt8 | TypeTag::NullableString)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::DateTime64Milli => "DateTime64(3)",
            TypeTag::UInt32 => "UInt32",
            TypeTag::NullableUInt8 => "Nullable(UInt8)",
            TypeTag::NullableString => "Nullable(String)",
            TypeTag::Str => "String",
            TypeTag::Unknown => "Unknown",
        };
        write!(f, "{}", name)
    }
}

/// One column of a table: name plus type classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name.
    pub name: String,

    /// Type classification driving coercion and decoding.
    pub type_tag: TypeTag,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            type_tag,
        }
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.type_tag)
    }
}

/// Ordered column specification for one table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema(Vec<ColumnSpec>);

impl Schema {
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self(columns)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.0
    }
}

impl FromIterator<ColumnSpec> for Schema {
    fn from_iter<T: IntoIterator<Item = ColumnSpec>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Compare an introspected schema against the registered one, positionally.
///
/// Fails immediately on a column count mismatch, otherwise on the first
/// index where `(name, type)` differs. The comparison is exact: no
/// reordering, case folding, or subset matching. Two empty schemas
/// compare equal.
pub fn validate(actual: &Schema, expected: &Schema) -> Result<()> {
    if actual.len() != expected.len() {
        return Err(Error::schema_count(expected.len(), actual.len()));
    }

    for (position, (a, e)) in actual.columns().iter().zip(expected.columns()).enumerate() {
        if a != e {
            return Err(Error::schema_column(position, e, a));
        }
    }

    Ok(())
}
