use serde::Serialize;

/// Operators that may appear under a field, e.g. `{ "age": { "$gt": 21 } }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    Not,
    Regex,
    Options,
    Exists,
    Type,
}

const FIELD_KEYWORDS: [(&str, Operator); 13] = [
    ("$eq", Operator::Eq),
    ("$ne", Operator::Ne),
    ("$gt", Operator::Gt),
    ("$gte", Operator::Gte),
    ("$lt", Operator::Lt),
    ("$lte", Operator::Lte),
    ("$in", Operator::In),
    ("$nin", Operator::Nin),
    ("$not", Operator::Not),
    ("$regex", Operator::Regex),
    ("$options", Operator::Options),
    ("$exists", Operator::Exists),
    ("$type", Operator::Type),
];

impl Operator {
    pub fn from_keyword(keyword: &str) -> Option<Operator> {
        FIELD_KEYWORDS
            .iter()
            .find(|(k, _)| *k == keyword)
            .map(|(_, op)| *op)
    }

    pub fn keyword(self) -> &'static str {
        FIELD_KEYWORDS
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(k, _)| *k)
            .unwrap_or("$unknown")
    }
}

/// Operators valid at the root of a filter document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOp {
    And,
    Or,
    Nor,
}

impl LogicalOp {
    pub fn from_keyword(keyword: &str) -> Option<LogicalOp> {
        match keyword {
            "$and" => Some(LogicalOp::And),
            "$or" => Some(LogicalOp::Or),
            "$nor" => Some(LogicalOp::Nor),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            LogicalOp::And => "$and",
            LogicalOp::Or => "$or",
            LogicalOp::Nor => "$nor",
        }
    }
}
