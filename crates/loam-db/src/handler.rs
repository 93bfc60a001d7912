use std::sync::Arc;

use bson::oid::ObjectId;
use bson::{Bson, Document, doc};
use loam_query::{Predicate, TypeRegistry, apply_sort, matches, parse_filter, parse_sort};
use loam_store::{Namespace, Store};

use crate::command::Command;
use crate::config::HandlerConfig;
use crate::error::CommandError;

const MIB: i64 = 1024 * 1024;

/// Executes client commands against a [`Store`].
///
/// Holds the one [`TypeRegistry`] shared by every filter compiled through
/// this handler.
pub struct Handler<S: Store> {
    store: S,
    registry: TypeRegistry,
    config: HandlerConfig,
}

impl<S: Store> Handler<S> {
    pub fn new(store: S, config: HandlerConfig) -> Self {
        Self {
            store,
            registry: TypeRegistry::new(),
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Run one command. Failures are returned as error replies, never as
    /// `Err`, so the result can always be written back to the client.
    pub fn handle(&self, request: &Document) -> Document {
        let name = request.keys().next().map(String::as_str).unwrap_or("");
        let db = request.get_str("$db").unwrap_or("");
        tracing::debug!(command = name, db, "handling command");

        match Command::parse(request).and_then(|cmd| self.execute(cmd)) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(command = name, code = e.code(), error = %e, "command failed");
                e.to_document()
            }
        }
    }

    pub fn execute(&self, command: Command) -> Result<Document, CommandError> {
        match command {
            Command::BuildInfo => Ok(self.build_info()),
            Command::GetParameter | Command::ServerStatus => Ok(doc! {
                "version": self.config.version.as_str(),
                "ok": 1.0,
            }),
            Command::ListDatabases => self.list_databases(),
            Command::ListCollections { db } => self.list_collections(&db),
            Command::DropDatabase { db } => self.drop_database(&db),
            Command::Create { ns } => {
                self.store.create_collection(&ns)?;
                Ok(doc! { "ok": 1.0 })
            }
            Command::Drop { ns } => {
                self.store.drop_collection(&ns)?;
                Ok(doc! { "nIndexesWas": 1, "ns": ns.to_string(), "ok": 1.0 })
            }
            Command::Insert { ns, documents } => self.insert(&ns, documents),
            Command::Find {
                ns,
                filter,
                sort,
                skip,
                limit,
            } => self.find(&ns, &filter, &sort, skip, limit),
            Command::Count { ns, query } => {
                let n = self.matching(&ns, &query)?.len();
                Ok(doc! { "n": i32::try_from(n).unwrap_or(i32::MAX), "ok": 1.0 })
            }
        }
    }

    fn build_info(&self) -> Document {
        let version_array: Vec<Bson> = self
            .config
            .version_array()
            .into_iter()
            .map(Bson::Int32)
            .collect();
        doc! {
            "version": self.config.version.as_str(),
            "versionArray": version_array,
            "maxBsonObjectSize": i32::try_from(self.config.max_bson_object_size)
                .unwrap_or(i32::MAX),
            "ok": 1.0,
        }
    }

    fn list_databases(&self) -> Result<Document, CommandError> {
        let infos = self.store.list_databases()?;
        let mut total_size = 0_i64;
        let databases: Vec<Bson> = infos
            .iter()
            .map(|info| {
                let size = i64::try_from(info.size_on_disk).unwrap_or(i64::MAX);
                total_size = total_size.saturating_add(size);
                Bson::Document(doc! {
                    "name": info.name.as_str(),
                    "sizeOnDisk": size,
                    "empty": info.is_empty(),
                })
            })
            .collect();
        Ok(doc! {
            "databases": databases,
            "totalSize": total_size,
            "totalSizeMb": total_size / MIB,
            "ok": 1.0,
        })
    }

    fn list_collections(&self, db: &str) -> Result<Document, CommandError> {
        let batch: Vec<Bson> = self
            .store
            .list_collections(db)?
            .into_iter()
            .map(|name| Bson::Document(doc! { "name": name, "type": "collection" }))
            .collect();
        Ok(doc! {
            "cursor": {
                "firstBatch": batch,
                "id": 0_i64,
                "ns": format!("{db}.$cmd.listCollections"),
            },
            "ok": 1.0,
        })
    }

    fn drop_database(&self, db: &str) -> Result<Document, CommandError> {
        if self.store.drop_database(db)? {
            Ok(doc! { "dropped": db, "ok": 1.0 })
        } else {
            Ok(doc! { "ok": 1.0 })
        }
    }

    fn insert(&self, ns: &Namespace, documents: Vec<Document>) -> Result<Document, CommandError> {
        let max = self.config.max_bson_object_size;
        let documents = documents
            .into_iter()
            .map(|doc| {
                let doc = with_id(doc);
                let size = bson::serialize_to_vec(&doc)
                    .map_err(|e| CommandError::Internal(e.to_string()))?
                    .len();
                if size > max {
                    return Err(CommandError::bad_value(format!(
                        "object to insert too large. size in bytes: {size}, max size: {max}"
                    )));
                }
                Ok(doc)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let n = self.store.insert(ns, documents)?;
        Ok(doc! { "n": i32::try_from(n).unwrap_or(i32::MAX), "ok": 1.0 })
    }

    fn find(
        &self,
        ns: &Namespace,
        filter: &Document,
        sort: &Document,
        skip: usize,
        limit: usize,
    ) -> Result<Document, CommandError> {
        let sorts = parse_sort(sort)?;
        let mut docs = self.matching(ns, filter)?;
        apply_sort(&mut docs, &sorts);

        let take = if limit == 0 { usize::MAX } else { limit };
        let batch: Vec<Bson> = docs
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|doc| Bson::Document(Arc::unwrap_or_clone(doc)))
            .collect();

        Ok(doc! {
            "cursor": {
                "firstBatch": batch,
                "id": 0_i64,
                "ns": ns.to_string(),
            },
            "ok": 1.0,
        })
    }

    fn matching(
        &self,
        ns: &Namespace,
        filter: &Document,
    ) -> Result<Vec<Arc<Document>>, CommandError> {
        let predicate: Predicate = parse_filter(filter, &self.registry)?;
        let mut docs = self.store.scan(ns)?;
        docs.retain(|doc| matches(doc, &predicate));
        Ok(docs)
    }
}

/// Put a fresh `_id` first if the document has none.
fn with_id(doc: Document) -> Document {
    if doc.contains_key("_id") {
        return doc;
    }
    let mut with_id = doc! { "_id": ObjectId::new() };
    with_id.extend(doc);
    with_id
}
