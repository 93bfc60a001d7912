use loam_query::QueryError;
use thiserror::Error;

use crate::store::Namespace;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("collection already exists: {0}")]
    NamespaceExists(Namespace),
    #[error("ns not found: {0}")]
    NamespaceNotFound(Namespace),
    #[error("invalid document: {0}")]
    InvalidDocument(#[from] QueryError),
    #[error("encoding error: {0}")]
    Encoding(#[from] bson::error::Error),
    #[error("storage error: {0}")]
    Storage(String),
}
