use bson::{Bson, Document};

use crate::compare::{compare_order, values_equal};
use crate::filter::{CompareOp, Membership, Pattern, Predicate};
use crate::types::TypeCode;
use crate::value::{Value, resolve_path};

/// Evaluate a compiled predicate against a document.
///
/// Never fails: a missing field or a comparison between incompatible kinds
/// is a non-match.
pub fn matches(doc: &Document, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Comparison { path, op, operand } => {
            let field = resolve_path(doc, path);
            match op {
                CompareOp::Eq => field_equals(field, operand),
                CompareOp::Ne => !field_equals(field, operand),
                _ => field_orders(field, *op, operand),
            }
        }
        Predicate::Membership { path, mode, values } => {
            let field = resolve_path(doc, path);
            let found = field.is_some() && values.iter().any(|v| field_equals(field, v));
            match mode {
                Membership::In => found,
                Membership::Nin => !found,
            }
        }
        Predicate::Pattern { path, pattern } => resolve_path(doc, path)
            .is_some_and(|field| field_matches_pattern(field, pattern)),
        Predicate::Exists { path, exists } => resolve_path(doc, path).is_some() == *exists,
        Predicate::Type { path, codes } => resolve_path(doc, path)
            .is_some_and(|field| field_has_type(field, codes)),
        Predicate::And(children) => children.iter().all(|c| matches(doc, c)),
        Predicate::Or(children) => children.iter().any(|c| matches(doc, c)),
        Predicate::Nor(children) => !children.iter().any(|c| matches(doc, c)),
        Predicate::Not(child) => !matches(doc, child),
    }
}

/// Apply `test` to the field as a whole, then to each element if it is an
/// array.
fn any_candidate(field: &Bson, mut test: impl FnMut(&Value<'_>) -> bool) -> bool {
    let Ok(value) = Value::try_from(field) else {
        return false;
    };
    if test(&value) {
        return true;
    }
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| Value::try_from(item).ok())
            .any(|item| test(&item)),
        _ => false,
    }
}

/// `{ field: operand }` semantics. An absent field equals null.
fn field_equals(field: Option<&Bson>, operand: &Bson) -> bool {
    let Ok(operand) = Value::try_from(operand) else {
        return false;
    };
    match field {
        None => operand == Value::Null,
        Some(field) => any_candidate(field, |candidate| values_equal(candidate, &operand)),
    }
}

fn field_orders(field: Option<&Bson>, op: CompareOp, operand: &Bson) -> bool {
    let (Some(field), Ok(operand)) = (field, Value::try_from(operand)) else {
        return false;
    };
    any_candidate(field, |candidate| {
        compare_order(candidate, &operand)
            .is_some_and(|ordering| op.accepts(ordering))
    })
}

fn field_matches_pattern(field: &Bson, pattern: &Pattern) -> bool {
    any_candidate(field, |candidate| {
        matches!(candidate, Value::String(s) if pattern.is_match(s))
    })
}

fn field_has_type(field: &Bson, codes: &[TypeCode]) -> bool {
    any_candidate(field, |candidate| {
        codes.iter().any(|code| code.matches(candidate))
    })
}
