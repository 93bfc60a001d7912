use bson::oid::ObjectId;
use bson::{Binary, Bson, DateTime, Document, Timestamp};

use crate::error::QueryError;
use crate::types::TypeCode;

/// A borrowed view of one storable value.
///
/// This is the closed set of kinds the query layer understands. `Bson`
/// carries more variants (javascript, symbol, decimal128, ...); those are
/// turned away by [`Value::try_from`] before any matching happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Double(f64),
    String(&'a str),
    Document(&'a Document),
    Array(&'a [Bson]),
    Binary(&'a Binary),
    ObjectId(ObjectId),
    Boolean(bool),
    DateTime(DateTime),
    Null,
    Regex {
        pattern: &'a str,
        options: &'a str,
    },
    Int32(i32),
    Timestamp(Timestamp),
    Int64(i64),
}

impl<'a> TryFrom<&'a Bson> for Value<'a> {
    type Error = QueryError;

    fn try_from(value: &'a Bson) -> Result<Self, Self::Error> {
        match value {
            Bson::Double(f) => Ok(Value::Double(*f)),
            Bson::String(s) => Ok(Value::String(s)),
            Bson::Document(d) => Ok(Value::Document(d)),
            Bson::Array(a) => Ok(Value::Array(a)),
            Bson::Binary(b) => Ok(Value::Binary(b)),
            Bson::ObjectId(oid) => Ok(Value::ObjectId(*oid)),
            Bson::Boolean(b) => Ok(Value::Boolean(*b)),
            Bson::DateTime(dt) => Ok(Value::DateTime(*dt)),
            Bson::Null => Ok(Value::Null),
            Bson::RegularExpression(re) => Ok(Value::Regex {
                pattern: re.pattern.as_str(),
                options: re.options.as_str(),
            }),
            Bson::Int32(n) => Ok(Value::Int32(*n)),
            Bson::Timestamp(ts) => Ok(Value::Timestamp(*ts)),
            Bson::Int64(n) => Ok(Value::Int64(*n)),
            Bson::Decimal128(_) => Err(unimplemented_kind(TypeCode::Decimal)),
            Bson::MinKey => Err(unimplemented_kind(TypeCode::MinKey)),
            Bson::MaxKey => Err(unimplemented_kind(TypeCode::MaxKey)),
            other => Err(QueryError::bad_value(format!(
                "unsupported BSON type: {:?}",
                other.element_type()
            ))),
        }
    }
}

fn unimplemented_kind(code: TypeCode) -> QueryError {
    QueryError::not_implemented(format!("Type code {} not implemented", code.code()))
}

/// Check that a value, and everything nested in it, is a storable kind.
pub fn validate_bson(value: &Bson) -> Result<(), QueryError> {
    match Value::try_from(value)? {
        Value::Array(items) => items.iter().try_for_each(validate_bson),
        Value::Document(doc) => validate_document(doc),
        _ => Ok(()),
    }
}

/// Validate every field in a document.
pub fn validate_document(doc: &Document) -> Result<(), QueryError> {
    doc.values().try_for_each(validate_bson)
}

/// Resolve a dotted field path against a document.
///
/// Each segment must land on a nested document; stepping into any other
/// kind, or through a missing key, yields `None`.
pub fn resolve_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        match current {
            Bson::Document(inner) => current = inner.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}
