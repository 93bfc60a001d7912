use bson::{Bson, Document};

use crate::error::QueryError;
use crate::filter::{CompareOp, Membership, Pattern, Predicate};
use crate::operator::{LogicalOp, Operator};
use crate::types::{TypeCode, TypeRegistry};
use crate::value::validate_bson;

/// Compiles the operand of one field operator.
type OperatorHandler =
    fn(&TypeRegistry, Operator, &str, &Bson) -> Result<Predicate, QueryError>;

/// `$regex` and `$options` read each other, so they have no standalone
/// handler.
fn handler(op: Operator) -> Option<OperatorHandler> {
    let compile: OperatorHandler = match op {
        Operator::Eq
        | Operator::Ne
        | Operator::Gt
        | Operator::Gte
        | Operator::Lt
        | Operator::Lte => compile_comparison,
        Operator::In | Operator::Nin => compile_membership,
        Operator::Not => compile_not,
        Operator::Exists => compile_exists,
        Operator::Type => compile_type,
        Operator::Regex | Operator::Options => return None,
    };
    Some(compile)
}

/// Parse a filter document into a [`Predicate`] tree.
///
/// Follows the document-database query grammar:
/// - the root is an implicit AND of its entries; `{}` matches everything
/// - `{ "field": value }` is an implicit `$eq`, or a pattern match when
///   `value` is a regex
/// - `{ "field": { "$gt": v, "$lt": w } }` ANDs the operators together
/// - `$and` / `$or` / `$nor` take arrays of sub-filters; `$nor` compiles
///   to `Not(Or(..))`
/// - `$regex` consumes a sibling `$options`, which overrides any flags
///   carried by a regex-valued `$regex`
///
/// Any error aborts the whole compilation.
pub fn parse_filter(
    filter: &Document,
    registry: &TypeRegistry,
) -> Result<Predicate, QueryError> {
    let mut children = Vec::with_capacity(filter.len());

    for (key, value) in filter {
        if key.starts_with('$') {
            let op = LogicalOp::from_keyword(key).ok_or_else(|| {
                QueryError::bad_value(format!("unknown top level operator: {key}"))
            })?;
            children.push(parse_logical(op, value, registry)?);
        } else {
            children.push(parse_field(key, value, registry)?);
        }
    }

    Ok(conjunction(children))
}

fn conjunction(mut children: Vec<Predicate>) -> Predicate {
    if children.len() == 1 {
        children.swap_remove(0)
    } else {
        Predicate::And(children)
    }
}

fn parse_logical(
    op: LogicalOp,
    value: &Bson,
    registry: &TypeRegistry,
) -> Result<Predicate, QueryError> {
    let keyword = op.keyword();
    let items = match value {
        Bson::Array(items) if !items.is_empty() => items,
        Bson::Array(_) => {
            return Err(QueryError::bad_value(format!(
                "{keyword} must be a nonempty array"
            )));
        }
        _ => return Err(QueryError::bad_value(format!("{keyword} must be an array"))),
    };

    let children = items
        .iter()
        .map(|item| match item {
            Bson::Document(sub) => parse_filter(sub, registry),
            _ => Err(QueryError::bad_value(format!(
                "{keyword} entries need to be full objects"
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(match op {
        LogicalOp::And => Predicate::And(children),
        LogicalOp::Or => Predicate::Or(children),
        LogicalOp::Nor => Predicate::not(Predicate::Or(children)),
    })
}

/// A document whose first key is `$`-prefixed is read as operators.
fn is_operator_doc(doc: &Document) -> bool {
    doc.keys().next().is_some_and(|k| k.starts_with('$'))
}

fn parse_field(path: &str, value: &Bson, registry: &TypeRegistry) -> Result<Predicate, QueryError> {
    match value {
        Bson::Document(sub) if is_operator_doc(sub) => parse_operator_doc(path, sub, registry),
        Bson::RegularExpression(re) => Ok(Predicate::Pattern {
            path: path.to_string(),
            pattern: Pattern::new(re.pattern.as_str(), re.options.as_str())?,
        }),
        literal => {
            validate_bson(literal)?;
            Ok(Predicate::eq(path, literal.clone()))
        }
    }
}

/// Parse an operator sub-document like `{ "$gt": 21, "$lte": 100 }`.
fn parse_operator_doc(
    path: &str,
    doc: &Document,
    registry: &TypeRegistry,
) -> Result<Predicate, QueryError> {
    let mut conditions = Vec::with_capacity(doc.len());

    for (key, operand) in doc {
        let op = Operator::from_keyword(key)
            .ok_or_else(|| QueryError::bad_value(format!("unknown operator: {key}")))?;

        let predicate = match (op, handler(op)) {
            (_, Some(compile)) => compile(registry, op, path, operand)?,
            (Operator::Regex, None) => compile_regex(path, operand, doc.get("$options"))?,
            (_, None) if doc.contains_key("$regex") => continue,
            (_, None) => return Err(malformed(op, path, "needs a $regex")),
        };
        conditions.push(predicate);
    }

    Ok(conjunction(conditions))
}

fn malformed(op: Operator, path: &str, reason: &str) -> QueryError {
    QueryError::bad_value(format!("{} {reason} (field '{path}')", op.keyword()))
}

fn compile_comparison(
    _registry: &TypeRegistry,
    op: Operator,
    path: &str,
    operand: &Bson,
) -> Result<Predicate, QueryError> {
    let compare = match op {
        Operator::Eq => CompareOp::Eq,
        Operator::Ne => CompareOp::Ne,
        Operator::Gt => CompareOp::Gt,
        Operator::Gte => CompareOp::Gte,
        Operator::Lt => CompareOp::Lt,
        Operator::Lte => CompareOp::Lte,
        other => return Err(malformed(other, path, "is not a comparison")),
    };
    validate_bson(operand)?;
    Ok(Predicate::comparison(path, compare, operand.clone()))
}

fn compile_membership(
    _registry: &TypeRegistry,
    op: Operator,
    path: &str,
    operand: &Bson,
) -> Result<Predicate, QueryError> {
    let mode = match op {
        Operator::In => Membership::In,
        Operator::Nin => Membership::Nin,
        other => return Err(malformed(other, path, "is not a membership test")),
    };
    let Bson::Array(items) = operand else {
        return Err(malformed(op, path, "needs an array"));
    };
    for item in items {
        if matches!(item, Bson::Document(d) if is_operator_doc(d)) {
            return Err(malformed(op, path, "cannot nest $ operators"));
        }
        validate_bson(item)?;
    }
    Ok(Predicate::Membership {
        path: path.to_string(),
        mode,
        values: items.clone(),
    })
}

fn compile_not(
    registry: &TypeRegistry,
    op: Operator,
    path: &str,
    operand: &Bson,
) -> Result<Predicate, QueryError> {
    let inner = match operand {
        Bson::Document(d) if d.is_empty() => return Err(malformed(op, path, "cannot be empty")),
        Bson::Document(d) if is_operator_doc(d) => parse_operator_doc(path, d, registry)?,
        Bson::RegularExpression(re) => Predicate::Pattern {
            path: path.to_string(),
            pattern: Pattern::new(re.pattern.as_str(), re.options.as_str())?,
        },
        literal => {
            validate_bson(literal)?;
            Predicate::eq(path, literal.clone())
        }
    };
    Ok(Predicate::not(inner))
}

fn compile_exists(
    _registry: &TypeRegistry,
    op: Operator,
    path: &str,
    operand: &Bson,
) -> Result<Predicate, QueryError> {
    let exists = match operand {
        Bson::Boolean(b) => *b,
        Bson::Int32(n) => *n != 0,
        Bson::Int64(n) => *n != 0,
        Bson::Double(f) => *f != 0.0,
        _ => return Err(malformed(op, path, "needs a boolean")),
    };
    Ok(Predicate::Exists {
        path: path.to_string(),
        exists,
    })
}

fn compile_type(
    registry: &TypeRegistry,
    op: Operator,
    path: &str,
    operand: &Bson,
) -> Result<Predicate, QueryError> {
    let codes = match operand {
        Bson::Array(items) if items.is_empty() => {
            return Err(malformed(op, path, "must match at least one type"));
        }
        Bson::Array(items) => items
            .iter()
            .map(|item| resolve_type(registry, op, path, item))
            .collect::<Result<Vec<_>, _>>()?,
        single => vec![resolve_type(registry, op, path, single)?],
    };
    Ok(Predicate::Type {
        path: path.to_string(),
        codes,
    })
}

fn resolve_type(
    registry: &TypeRegistry,
    op: Operator,
    path: &str,
    value: &Bson,
) -> Result<TypeCode, QueryError> {
    let code = match value {
        Bson::String(alias) => {
            return registry.code_for_alias(alias).ok_or_else(|| {
                QueryError::bad_value(format!("Unknown type name alias: {alias}"))
            });
        }
        Bson::Int32(n) => *n,
        Bson::Int64(n) => i32::try_from(*n).map_err(|_| {
            QueryError::bad_value(format!("Invalid numerical type code: {n}"))
        })?,
        Bson::Double(f)
            if f.fract() == 0.0
                && *f >= f64::from(i32::MIN)
                && *f <= f64::from(i32::MAX) =>
        {
            *f as i32
        }
        _ => {
            return Err(malformed(
                op,
                path,
                "type must be represented as a number or a string",
            ));
        }
    };
    registry.validate_code(code)
}

/// Build a pattern from a `$regex` operand and an optional sibling
/// `$options`. Sibling options replace, rather than extend, the flags of
/// a regex-valued operand.
fn compile_regex(
    path: &str,
    operand: &Bson,
    options: Option<&Bson>,
) -> Result<Predicate, QueryError> {
    let sibling = match options {
        None => None,
        Some(Bson::String(s)) => Some(s.as_str()),
        Some(_) => return Err(malformed(Operator::Options, path, "has to be a string")),
    };

    let pattern = match operand {
        Bson::String(p) => Pattern::new(p, sibling.unwrap_or(""))?,
        Bson::RegularExpression(re) => Pattern::new(
            re.pattern.as_str(),
            sibling.unwrap_or(re.options.as_str()),
        )?,
        _ => return Err(malformed(Operator::Regex, path, "has to be a string")),
    };

    Ok(Predicate::Pattern {
        path: path.to_string(),
        pattern,
    })
}
