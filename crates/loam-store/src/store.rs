use std::fmt;
use std::sync::Arc;

use bson::Document;

use crate::error::StoreError;

/// A `(database, collection)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace {
    pub db: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(db: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            db: db.into(),
            collection: collection.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.db, self.collection)
    }
}

/// Summary of one database, as reported by `listDatabases`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseInfo {
    pub name: String,
    /// Encoded size of every stored document, in bytes.
    pub size_on_disk: u64,
    pub collections: usize,
}

impl DatabaseInfo {
    /// No stored bytes, even if collections exist.
    pub fn is_empty(&self) -> bool {
        self.size_on_disk == 0
    }
}

/// Backing storage for collections of documents.
///
/// Implementations own their own locking; every method takes `&self` so a
/// store can be shared across request handlers.
pub trait Store: Send + Sync {
    /// Fails with [`StoreError::NamespaceExists`] if the collection is
    /// already there.
    fn create_collection(&self, ns: &Namespace) -> Result<(), StoreError>;
    /// Fails with [`StoreError::NamespaceNotFound`] if there is nothing to drop.
    fn drop_collection(&self, ns: &Namespace) -> Result<(), StoreError>;
    /// Returns whether the database existed.
    fn drop_database(&self, db: &str) -> Result<bool, StoreError>;
    /// Databases in name order.
    fn list_databases(&self) -> Result<Vec<DatabaseInfo>, StoreError>;
    /// Collection names of `db` in name order; empty for an unknown database.
    fn list_collections(&self, db: &str) -> Result<Vec<String>, StoreError>;
    fn collection_exists(&self, ns: &Namespace) -> Result<bool, StoreError>;
    /// Validate and append documents, creating the collection if needed.
    /// Nothing is written unless every document is accepted.
    fn insert(&self, ns: &Namespace, docs: Vec<Document>) -> Result<usize, StoreError>;
    /// Point-in-time snapshot of a collection in insertion order. A missing
    /// collection scans as empty.
    fn scan(&self, ns: &Namespace) -> Result<Vec<Arc<Document>>, StoreError>;
}
