use std::collections::HashMap;

use serde::Serialize;

use crate::error::QueryError;
use crate::value::Value;

/// BSON type codes, as accepted by the `$type` operator.
///
/// `Number` is not a real BSON code: it is the surrogate alias matching
/// double, int and long. `Decimal`, `MinKey` and `MaxKey` are recognized
/// so they can be rejected as not implemented rather than unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "i32")]
#[repr(i32)]
pub enum TypeCode {
    Double = 1,
    String = 2,
    Object = 3,
    Array = 4,
    BinData = 5,
    ObjectId = 7,
    Bool = 8,
    Date = 9,
    Null = 10,
    Regex = 11,
    Int = 16,
    Timestamp = 17,
    Long = 18,
    Decimal = 19,
    MinKey = -1,
    MaxKey = 127,
    Number = -128,
}

impl TypeCode {
    /// Codes that queries may use: every implemented kind plus `number`.
    pub const SUPPORTED: [TypeCode; 14] = [
        TypeCode::Double,
        TypeCode::String,
        TypeCode::Object,
        TypeCode::Array,
        TypeCode::BinData,
        TypeCode::ObjectId,
        TypeCode::Bool,
        TypeCode::Date,
        TypeCode::Null,
        TypeCode::Regex,
        TypeCode::Int,
        TypeCode::Timestamp,
        TypeCode::Long,
        TypeCode::Number,
    ];

    pub const UNIMPLEMENTED: [TypeCode; 3] =
        [TypeCode::Decimal, TypeCode::MinKey, TypeCode::MaxKey];

    pub fn code(self) -> i32 {
        self as i32
    }

    /// Lowercase protocol name of the code.
    pub fn alias(self) -> &'static str {
        match self {
            TypeCode::Double => "double",
            TypeCode::String => "string",
            TypeCode::Object => "object",
            TypeCode::Array => "array",
            TypeCode::BinData => "binData",
            TypeCode::ObjectId => "objectId",
            TypeCode::Bool => "bool",
            TypeCode::Date => "date",
            TypeCode::Null => "null",
            TypeCode::Regex => "regex",
            TypeCode::Int => "int",
            TypeCode::Timestamp => "timestamp",
            TypeCode::Long => "long",
            TypeCode::Decimal => "decimal",
            TypeCode::MinKey => "minKey",
            TypeCode::MaxKey => "maxKey",
            TypeCode::Number => "number",
        }
    }

    /// Whether a value's storage kind is of this type.
    ///
    /// Unlike [`classify`](crate::classify), no numeric unification happens
    /// here: a stored `5.0` is a double, not an int.
    pub fn matches(self, value: &Value<'_>) -> bool {
        match (self, value) {
            (TypeCode::Number, Value::Double(_) | Value::Int32(_) | Value::Int64(_)) => true,
            (TypeCode::Double, Value::Double(_))
            | (TypeCode::String, Value::String(_))
            | (TypeCode::Object, Value::Document(_))
            | (TypeCode::Array, Value::Array(_))
            | (TypeCode::BinData, Value::Binary(_))
            | (TypeCode::ObjectId, Value::ObjectId(_))
            | (TypeCode::Bool, Value::Boolean(_))
            | (TypeCode::Date, Value::DateTime(_))
            | (TypeCode::Null, Value::Null)
            | (TypeCode::Regex, Value::Regex { .. })
            | (TypeCode::Int, Value::Int32(_))
            | (TypeCode::Timestamp, Value::Timestamp(_))
            | (TypeCode::Long, Value::Int64(_)) => true,
            _ => false,
        }
    }

    fn from_code(code: i32) -> Option<TypeCode> {
        TypeCode::SUPPORTED
            .iter()
            .chain(TypeCode::UNIMPLEMENTED.iter())
            .copied()
            .find(|c| c.code() == code)
    }
}

impl From<TypeCode> for i32 {
    fn from(code: TypeCode) -> Self {
        code.code()
    }
}

impl std::fmt::Display for TypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.alias())
    }
}

/// Lookup tables for type codes and their string aliases.
///
/// Built once and then shared read-only; hand the same instance (or an
/// `Arc` of it) to every compiler call site.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    by_alias: HashMap<&'static str, TypeCode>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let by_alias = TypeCode::SUPPORTED
            .iter()
            .map(|&code| (code.alias(), code))
            .collect();
        Self { by_alias }
    }

    /// Resolve a numeric `$type` argument.
    pub fn validate_code(&self, code: i32) -> Result<TypeCode, QueryError> {
        match TypeCode::from_code(code) {
            Some(c) if TypeCode::UNIMPLEMENTED.contains(&c) => Err(QueryError::not_implemented(
                format!("Type code {code} not implemented"),
            )),
            Some(c) => Ok(c),
            None => Err(QueryError::bad_value(format!(
                "Invalid numerical type code: {code}"
            ))),
        }
    }

    pub fn alias_for(&self, code: TypeCode) -> &'static str {
        code.alias()
    }

    pub fn code_for_alias(&self, alias: &str) -> Option<TypeCode> {
        self.by_alias.get(alias).copied()
    }

    /// The alias table in canonical code order.
    pub fn aliases(&self) -> impl Iterator<Item = (&'static str, TypeCode)> + '_ {
        TypeCode::SUPPORTED.iter().map(|&c| (c.alias(), c))
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
