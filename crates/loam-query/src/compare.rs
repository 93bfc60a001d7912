use std::cmp::Ordering;

use bson::{Bson, Document};

use crate::classify::{Label, classify, homogeneous_label};
use crate::value::Value;

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

fn as_number(value: &Value<'_>) -> Option<Number> {
    match value {
        Value::Int32(n) => Some(Number::Int(i64::from(*n))),
        Value::Int64(n) => Some(Number::Int(*n)),
        Value::Double(f) => Some(Number::Float(*f)),
        _ => None,
    }
}

/// 2^63 as a float; the smallest double above `i64::MAX`.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

/// Exact comparison of an integer against a float, without rounding the
/// integer through `f64`.
fn cmp_int_float(i: i64, f: f64) -> Option<Ordering> {
    if f.is_nan() {
        return None;
    }
    if f >= TWO_POW_63 {
        return Some(Ordering::Less);
    }
    if f < -TWO_POW_63 {
        return Some(Ordering::Greater);
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => whole.partial_cmp(&f),
        other => Some(other),
    }
}

/// Compare two numbers by mathematical value. Two NaNs are equal; NaN
/// against anything else is unordered.
fn cmp_numbers(a: Number, b: Number) -> Option<Ordering> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => Some(x.cmp(&y)),
        (Number::Float(x), Number::Float(y)) if x.is_nan() && y.is_nan() => Some(Ordering::Equal),
        (Number::Float(x), Number::Float(y)) => x.partial_cmp(&y),
        (Number::Int(x), Number::Float(y)) => cmp_int_float(x, y),
        (Number::Float(x), Number::Int(y)) => cmp_int_float(y, x).map(Ordering::reverse),
    }
}

/// Query equality between two values.
///
/// Values must share a canonical label; numbers then compare by value
/// across storage widths, documents field-by-field in order, arrays
/// element-wise.
pub fn values_equal(a: &Value<'_>, b: &Value<'_>) -> bool {
    if classify(a) != classify(b) {
        return false;
    }
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return cmp_numbers(x, y) == Some(Ordering::Equal);
    }
    match (a, b) {
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Document(x), Value::Document(y)) => documents_equal(x, y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(p, q)| bson_equal(p, q))
        }
        (Value::Binary(x), Value::Binary(y)) => x.subtype == y.subtype && x.bytes == y.bytes,
        (Value::ObjectId(x), Value::ObjectId(y)) => x == y,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::DateTime(x), Value::DateTime(y)) => {
            x.timestamp_millis() == y.timestamp_millis()
        }
        (Value::Null, Value::Null) => true,
        (
            Value::Regex {
                pattern: p1,
                options: o1,
            },
            Value::Regex {
                pattern: p2,
                options: o2,
            },
        ) => p1 == p2 && o1 == o2,
        (Value::Timestamp(x), Value::Timestamp(y)) => {
            x.time == y.time && x.increment == y.increment
        }
        _ => false,
    }
}

/// [`values_equal`] over raw BSON; kinds outside the model never compare equal.
pub fn bson_equal(a: &Bson, b: &Bson) -> bool {
    match (Value::try_from(a), Value::try_from(b)) {
        (Ok(x), Ok(y)) => values_equal(&x, &y),
        _ => false,
    }
}

fn documents_equal(a: &Document, b: &Document) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b.iter())
            .all(|((ka, va), (kb, vb))| ka == kb && bson_equal(va, vb))
}

/// Ordering used by `$gt`, `$gte`, `$lt` and `$lte`.
///
/// Defined for the numeric family, strings (by code point), dates, and
/// arrays whose elements are homogeneous and mutually ordered. Anything
/// else is unordered and the comparison simply does not match.
pub fn compare_order(a: &Value<'_>, b: &Value<'_>) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return cmp_numbers(x, y);
    }
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::DateTime(x), Value::DateTime(y)) => {
            Some(x.timestamp_millis().cmp(&y.timestamp_millis()))
        }
        (Value::Array(x), Value::Array(y)) => compare_arrays(x, y),
        _ => None,
    }
}

fn compare_arrays(a: &[Bson], b: &[Bson]) -> Option<Ordering> {
    let left = homogeneous_label(a).ok()?;
    let right = homogeneous_label(b).ok()?;
    if let (Some(l), Some(r)) = (left, right) {
        if l != r && !(l.is_numeric() && r.is_numeric()) {
            return None;
        }
    }
    for (x, y) in a.iter().zip(b.iter()) {
        let x = Value::try_from(x).ok()?;
        let y = Value::try_from(y).ok()?;
        match compare_order(&x, &y)? {
            Ordering::Equal => continue,
            other => return Some(other),
        }
    }
    Some(a.len().cmp(&b.len()))
}

/// Position of a value in the cross-type sort order. Missing fields sort
/// with null.
fn sort_rank(value: Option<&Value<'_>>) -> u8 {
    match value.map(classify) {
        None | Some(Label::Null) => 1,
        Some(Label::Int | Label::Double) => 2,
        Some(Label::String) => 3,
        Some(Label::Object) => 4,
        Some(Label::Array) => 5,
        Some(Label::BinData) => 6,
        Some(Label::ObjectId) => 7,
        Some(Label::Bool) => 8,
        Some(Label::Date) => 9,
        Some(Label::Timestamp) => 10,
        Some(Label::Regex) => 11,
    }
}

/// Total order over (possibly missing) values, as used by `sort`.
///
/// Kinds are ranked null < numbers < strings < objects < arrays < binData
/// < objectId < bool < date < timestamp < regex; NaN sorts below every
/// other number.
pub fn total_order(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let a = a.and_then(|v| Value::try_from(v).ok());
    let b = b.and_then(|v| Value::try_from(v).ok());
    let rank = sort_rank(a.as_ref()).cmp(&sort_rank(b.as_ref()));
    if rank != Ordering::Equal {
        return rank;
    }
    let (Some(a), Some(b)) = (a, b) else {
        return Ordering::Equal;
    };
    if let (Some(x), Some(y)) = (as_number(&a), as_number(&b)) {
        return cmp_numbers(x, y).unwrap_or_else(|| {
            let x_nan = matches!(x, Number::Float(f) if f.is_nan());
            let y_nan = matches!(y, Number::Float(f) if f.is_nan());
            y_nan.cmp(&x_nan)
        });
    }
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Document(x), Value::Document(y)) => {
            for ((kx, vx), (ky, vy)) in x.iter().zip(y.iter()) {
                let ord = kx.cmp(ky).then_with(|| total_order(Some(vx), Some(vy)));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Array(x), Value::Array(y)) => {
            for (vx, vy) in x.iter().zip(y.iter()) {
                let ord = total_order(Some(vx), Some(vy));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Binary(x), Value::Binary(y)) => x
            .bytes
            .len()
            .cmp(&y.bytes.len())
            .then_with(|| x.bytes.cmp(&y.bytes)),
        (Value::ObjectId(x), Value::ObjectId(y)) => x.bytes().cmp(&y.bytes()),
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(&y),
        (Value::DateTime(x), Value::DateTime(y)) => {
            x.timestamp_millis().cmp(&y.timestamp_millis())
        }
        (Value::Timestamp(x), Value::Timestamp(y)) => {
            (x.time, x.increment).cmp(&(y.time, y.increment))
        }
        (
            Value::Regex {
                pattern: p1,
                options: o1,
            },
            Value::Regex {
                pattern: p2,
                options: o2,
            },
        ) => p1.cmp(p2).then_with(|| o1.cmp(o2)),
        _ => Ordering::Equal,
    }
}
