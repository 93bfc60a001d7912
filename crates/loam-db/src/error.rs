use bson::{Document, doc};
use loam_query::QueryError;
use loam_store::{Namespace, StoreError};
use thiserror::Error;

/// A failed command. Every variant maps to a protocol error code.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("{0}")]
    BadValue(String),
    #[error("Collection already exists. NS: {0}")]
    NamespaceExists(Namespace),
    #[error("ns not found")]
    NamespaceNotFound(Namespace),
    #[error("no such command: '{0}'")]
    CommandNotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl CommandError {
    pub(crate) fn bad_value(msg: impl Into<String>) -> Self {
        CommandError::BadValue(msg.into())
    }

    pub fn code(&self) -> i32 {
        match self {
            CommandError::Query(e) => e.code(),
            CommandError::BadValue(_) => 2,
            CommandError::NamespaceExists(_) => 48,
            CommandError::NamespaceNotFound(_) => 26,
            CommandError::CommandNotFound(_) => 59,
            CommandError::Internal(_) => 1,
        }
    }

    pub fn code_name(&self) -> &'static str {
        match self {
            CommandError::Query(e) => e.code_name(),
            CommandError::BadValue(_) => "BadValue",
            CommandError::NamespaceExists(_) => "NamespaceExists",
            CommandError::NamespaceNotFound(_) => "NamespaceNotFound",
            CommandError::CommandNotFound(_) => "CommandNotFound",
            CommandError::Internal(_) => "InternalError",
        }
    }

    /// The error reply sent in place of a command result.
    pub fn to_document(&self) -> Document {
        doc! {
            "ok": 0.0,
            "errmsg": self.to_string(),
            "code": self.code(),
            "codeName": self.code_name(),
        }
    }
}

impl From<StoreError> for CommandError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NamespaceExists(ns) => CommandError::NamespaceExists(ns),
            StoreError::NamespaceNotFound(ns) => CommandError::NamespaceNotFound(ns),
            StoreError::InvalidDocument(e) => CommandError::Query(e),
            other => CommandError::Internal(other.to_string()),
        }
    }
}
