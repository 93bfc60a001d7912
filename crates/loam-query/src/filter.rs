use std::cmp::Ordering;

use bson::Bson;
use regex::Regex;
use serde::Serialize;

use crate::error::QueryError;
use crate::types::TypeCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    /// Whether `field <op> operand` holds given `field.cmp(operand)`.
    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Gte => ordering != Ordering::Less,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Lte => ordering != Ordering::Greater,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    In,
    Nin,
}

/// A compiled `$regex`: the source pattern, its flags, and the matcher.
#[derive(Debug, Clone, Serialize)]
pub struct Pattern {
    pattern: String,
    options: String,
    #[serde(skip)]
    regex: Regex,
}

impl Pattern {
    /// Compile `pattern` under `options`. Only `i` is supported.
    pub fn new(pattern: &str, options: &str) -> Result<Self, QueryError> {
        if let Some(c) = options.chars().find(|&c| c != 'i') {
            return Err(QueryError::bad_value(format!(
                "invalid flag in regex options: {c}"
            )));
        }
        let mut source = String::with_capacity(pattern.len() + 4);
        if options.contains('i') {
            source.push_str("(?i)");
        }
        source.push_str(pattern);

        let regex = Regex::new(&source)
            .map_err(|e| QueryError::bad_value(format!("invalid regex pattern: {e}")))?;

        Ok(Self {
            pattern: pattern.to_string(),
            options: options.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn options(&self) -> &str {
        &self.options
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.options == other.options
    }
}

/// A compiled filter.
///
/// Produced by [`parse_filter`](crate::parse_filter) and consumed either by
/// [`matches`](crate::matches) or by a backend translator. Field paths are
/// dotted (`"address.city"`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Comparison {
        path: String,
        op: CompareOp,
        operand: Bson,
    },
    Membership {
        path: String,
        mode: Membership,
        values: Vec<Bson>,
    },
    Pattern {
        path: String,
        pattern: Pattern,
    },
    Exists {
        path: String,
        exists: bool,
    },
    Type {
        path: String,
        codes: Vec<TypeCode>,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Nor(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn comparison(path: impl Into<String>, op: CompareOp, operand: impl Into<Bson>) -> Self {
        Predicate::Comparison {
            path: path.into(),
            op,
            operand: operand.into(),
        }
    }

    pub fn eq(path: impl Into<String>, operand: impl Into<Bson>) -> Self {
        Self::comparison(path, CompareOp::Eq, operand)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(child: Predicate) -> Self {
        Predicate::Not(Box::new(child))
    }

    /// Matches every document.
    pub fn always() -> Self {
        Predicate::And(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_flag() {
        let p = Pattern::new("hoffman", "i").unwrap();
        assert!(p.is_match("HOFFMAN"));
        assert_eq!(p.options(), "i");

        let p = Pattern::new("hoffman", "").unwrap();
        assert!(!p.is_match("HOFFMAN"));
        assert!(p.is_match("hoffman"));
    }

    #[test]
    fn repeated_case_flag_is_accepted() {
        let p = Pattern::new("^wood", "ii").unwrap();
        assert!(p.is_match("WOODY"));
        assert_eq!(p.options(), "ii");
    }

    #[test]
    fn unknown_flags_are_rejected() {
        for opts in ["m", "s", "x", "ig"] {
            let err = Pattern::new("a", opts).unwrap_err();
            assert!(matches!(err, QueryError::BadValue(ref m) if m.contains("invalid flag")));
        }
    }

    #[test]
    fn invalid_pattern_is_bad_value() {
        let err = Pattern::new("[invalid", "").unwrap_err();
        assert!(matches!(err, QueryError::BadValue(ref m) if m.contains("invalid regex")));
    }

    #[test]
    fn pattern_equality_ignores_compiled_form() {
        assert_eq!(
            Pattern::new("^a", "i").unwrap(),
            Pattern::new("^a", "i").unwrap()
        );
        assert_ne!(
            Pattern::new("^a", "i").unwrap(),
            Pattern::new("^a", "").unwrap()
        );
    }

    #[test]
    fn compare_op_accepts() {
        assert!(CompareOp::Gte.accepts(Ordering::Equal));
        assert!(!CompareOp::Gt.accepts(Ordering::Equal));
        assert!(CompareOp::Lte.accepts(Ordering::Less));
        assert!(!CompareOp::Lt.accepts(Ordering::Greater));
    }
}
