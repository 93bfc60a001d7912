use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use arc_swap::ArcSwap;
use bson::Document;
use imbl::OrdMap;
use loam_query::validate_document;

use crate::error::StoreError;
use crate::store::{DatabaseInfo, Namespace, Store};

struct StoredDocument {
    doc: Arc<Document>,
    /// Encoded BSON length.
    size: u64,
}

/// Insertion sequence number -> document.
type Collection = OrdMap<u64, Arc<StoredDocument>>;

type Databases = BTreeMap<String, BTreeMap<String, Arc<ArcSwap<Collection>>>>;

/// In-memory store built on persistent maps.
///
/// Each collection is an `ArcSwap` over an imbl `OrdMap`, so a scan clones
/// a snapshot in O(1) and never blocks on writers. Writers serialize on
/// `write_lock`, build the next version off the current one and swap it in.
pub struct MemoryStore {
    databases: RwLock<Databases>,
    write_lock: Mutex<()>,
    next_seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            databases: RwLock::new(BTreeMap::new()),
            write_lock: Mutex::new(()),
            next_seq: AtomicU64::new(0),
        }
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock
            .lock()
            .map_err(|e| StoreError::Storage(format!("write lock poisoned: {e}")))
    }

    fn read_databases(&self) -> Result<std::sync::RwLockReadGuard<'_, Databases>, StoreError> {
        self.databases
            .read()
            .map_err(|e| StoreError::Storage(format!("catalog lock poisoned: {e}")))
    }

    fn write_databases(&self) -> Result<std::sync::RwLockWriteGuard<'_, Databases>, StoreError> {
        self.databases
            .write()
            .map_err(|e| StoreError::Storage(format!("catalog lock poisoned: {e}")))
    }

    fn collection(&self, ns: &Namespace) -> Result<Option<Arc<ArcSwap<Collection>>>, StoreError> {
        let databases = self.read_databases()?;
        Ok(databases
            .get(&ns.db)
            .and_then(|colls| colls.get(&ns.collection))
            .cloned())
    }

    /// Get or create a collection. Caller must hold the write lock.
    fn ensure_collection(&self, ns: &Namespace) -> Result<Arc<ArcSwap<Collection>>, StoreError> {
        if let Some(existing) = self.collection(ns)? {
            return Ok(existing);
        }
        let mut databases = self.write_databases()?;
        let created = databases
            .entry(ns.db.clone())
            .or_default()
            .entry(ns.collection.clone())
            .or_insert_with(|| Arc::new(ArcSwap::from_pointee(OrdMap::new())))
            .clone();
        tracing::debug!(ns = %ns, "collection created");
        Ok(created)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn create_collection(&self, ns: &Namespace) -> Result<(), StoreError> {
        let _guard = self.lock_writes()?;
        if self.collection(ns)?.is_some() {
            return Err(StoreError::NamespaceExists(ns.clone()));
        }
        self.ensure_collection(ns)?;
        Ok(())
    }

    fn drop_collection(&self, ns: &Namespace) -> Result<(), StoreError> {
        let _guard = self.lock_writes()?;
        let mut databases = self.write_databases()?;
        let colls = databases
            .get_mut(&ns.db)
            .ok_or_else(|| StoreError::NamespaceNotFound(ns.clone()))?;
        colls
            .remove(&ns.collection)
            .ok_or_else(|| StoreError::NamespaceNotFound(ns.clone()))?;
        if colls.is_empty() {
            databases.remove(&ns.db);
        }
        tracing::debug!(ns = %ns, "collection dropped");
        Ok(())
    }

    fn drop_database(&self, db: &str) -> Result<bool, StoreError> {
        let _guard = self.lock_writes()?;
        let dropped = self.write_databases()?.remove(db).is_some();
        if dropped {
            tracing::debug!(db, "database dropped");
        }
        Ok(dropped)
    }

    fn list_databases(&self) -> Result<Vec<DatabaseInfo>, StoreError> {
        let databases = self.read_databases()?;
        Ok(databases
            .iter()
            .map(|(name, colls)| {
                let size_on_disk = colls
                    .values()
                    .map(|coll| coll.load().values().map(|d| d.size).sum::<u64>())
                    .sum();
                DatabaseInfo {
                    name: name.clone(),
                    size_on_disk,
                    collections: colls.len(),
                }
            })
            .collect())
    }

    fn list_collections(&self, db: &str) -> Result<Vec<String>, StoreError> {
        let databases = self.read_databases()?;
        Ok(databases
            .get(db)
            .map(|colls| colls.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn collection_exists(&self, ns: &Namespace) -> Result<bool, StoreError> {
        Ok(self.collection(ns)?.is_some())
    }

    fn insert(&self, ns: &Namespace, docs: Vec<Document>) -> Result<usize, StoreError> {
        let mut encoded = Vec::with_capacity(docs.len());
        for doc in docs {
            validate_document(&doc)?;
            let size = bson::serialize_to_vec(&doc)?.len() as u64;
            encoded.push(StoredDocument {
                doc: Arc::new(doc),
                size,
            });
        }

        let _guard = self.lock_writes()?;
        let coll = self.ensure_collection(ns)?;
        let mut next = (**coll.load()).clone();
        let n = encoded.len();
        for stored in encoded {
            let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
            next.insert(seq, Arc::new(stored));
        }
        coll.store(Arc::new(next));
        tracing::debug!(ns = %ns, n, "documents inserted");
        Ok(n)
    }

    fn scan(&self, ns: &Namespace) -> Result<Vec<Arc<Document>>, StoreError> {
        let Some(coll) = self.collection(ns)? else {
            return Ok(Vec::new());
        };
        let snapshot = coll.load_full();
        Ok(snapshot
            .values()
            .map(|stored| Arc::clone(&stored.doc))
            .collect())
    }
}
