use bson::Bson;

use crate::value::Value;

/// Canonical type label of a value.
///
/// Numbers are unified: int32, int64 and integral doubles are all `Int`,
/// so `[1, 2_i64, 3.0]` reads as one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Object,
    Array,
    Double,
    Int,
    String,
    BinData,
    ObjectId,
    Bool,
    Date,
    Null,
    Regex,
    Timestamp,
}

impl Label {
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Object => "object",
            Label::Array => "array",
            Label::Double => "double",
            Label::Int => "int",
            Label::String => "string",
            Label::BinData => "binData",
            Label::ObjectId => "objectId",
            Label::Bool => "bool",
            Label::Date => "date",
            Label::Null => "null",
            Label::Regex => "regex",
            Label::Timestamp => "timestamp",
        }
    }

    /// `Int` and `Double` order against each other by value.
    pub fn is_numeric(self) -> bool {
        matches!(self, Label::Int | Label::Double)
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify one value. Documents and arrays are labelled structurally;
/// their contents are not inspected.
pub fn classify(value: &Value<'_>) -> Label {
    match value {
        Value::Document(_) => Label::Object,
        Value::Array(_) => Label::Array,
        Value::Double(f) => {
            if is_integral(*f) {
                Label::Int
            } else {
                Label::Double
            }
        }
        Value::String(_) => Label::String,
        Value::Binary(_) => Label::BinData,
        Value::ObjectId(_) => Label::ObjectId,
        Value::Boolean(_) => Label::Bool,
        Value::DateTime(_) => Label::Date,
        Value::Null => Label::Null,
        Value::Regex { .. } => Label::Regex,
        Value::Int32(_) | Value::Int64(_) => Label::Int,
        Value::Timestamp(_) => Label::Timestamp,
    }
}

/// Classify a raw BSON value; `None` for kinds outside the storable set.
pub fn classify_bson(value: &Bson) -> Option<Label> {
    Value::try_from(value).ok().map(|v| classify(&v))
}

/// A float with no fractional part that is neither NaN nor infinite.
pub(crate) fn is_integral(f: f64) -> bool {
    f.is_finite() && f == f.trunc()
}

/// Whether every element of `items` carries the same label.
///
/// Empty and single-element sequences are trivially homogeneous. An
/// element outside the storable set makes the sequence heterogeneous.
pub fn is_homogeneous(items: &[Bson]) -> bool {
    homogeneous_label(items).is_ok()
}

/// The shared label of a homogeneous sequence (`None` when empty).
pub(crate) fn homogeneous_label(items: &[Bson]) -> Result<Option<Label>, ()> {
    let mut iter = items.iter();
    let Some(first) = iter.next() else {
        return Ok(None);
    };
    let label = classify_bson(first).ok_or(())?;
    for item in iter {
        if classify_bson(item) != Some(label) {
            return Err(());
        }
    }
    Ok(Some(label))
}
