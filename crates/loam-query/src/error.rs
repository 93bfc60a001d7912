use thiserror::Error;

/// Errors raised while compiling a filter or validating a type code.
///
/// Evaluation never produces one of these: a missing field or a
/// type-incompatible comparison is simply a non-match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Malformed operator syntax, invalid type code, bad regex option,
    /// unknown operator keyword.
    #[error("{0}")]
    BadValue(String),
    /// A type the protocol recognizes but this server does not support.
    #[error("{0}")]
    NotImplemented(String),
}

impl QueryError {
    pub(crate) fn bad_value(msg: impl Into<String>) -> Self {
        QueryError::BadValue(msg.into())
    }

    pub(crate) fn not_implemented(msg: impl Into<String>) -> Self {
        QueryError::NotImplemented(msg.into())
    }

    /// Numeric protocol error code reported to clients.
    pub fn code(&self) -> i32 {
        match self {
            QueryError::BadValue(_) => 2,
            QueryError::NotImplemented(_) => 238,
        }
    }

    pub fn code_name(&self) -> &'static str {
        match self {
            QueryError::BadValue(_) => "BadValue",
            QueryError::NotImplemented(_) => "NotImplemented",
        }
    }
}
