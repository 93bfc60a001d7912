use bson::{Bson, Document};
use loam_store::Namespace;

use crate::error::CommandError;

/// A parsed client command. The command name is the first key of the
/// request document.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    BuildInfo,
    GetParameter,
    ServerStatus,
    ListDatabases,
    ListCollections {
        db: String,
    },
    DropDatabase {
        db: String,
    },
    Create {
        ns: Namespace,
    },
    Drop {
        ns: Namespace,
    },
    Insert {
        ns: Namespace,
        documents: Vec<Document>,
    },
    Find {
        ns: Namespace,
        filter: Document,
        sort: Document,
        skip: usize,
        /// 0 means no limit.
        limit: usize,
    },
    Count {
        ns: Namespace,
        query: Document,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::BuildInfo => "buildInfo",
            Command::GetParameter => "getParameter",
            Command::ServerStatus => "serverStatus",
            Command::ListDatabases => "listDatabases",
            Command::ListCollections { .. } => "listCollections",
            Command::DropDatabase { .. } => "dropDatabase",
            Command::Create { .. } => "create",
            Command::Drop { .. } => "drop",
            Command::Insert { .. } => "insert",
            Command::Find { .. } => "find",
            Command::Count { .. } => "count",
        }
    }

    pub fn parse(request: &Document) -> Result<Command, CommandError> {
        let Some((name, _)) = request.iter().next() else {
            return Err(CommandError::bad_value("empty command document"));
        };

        match name.as_str() {
            "buildInfo" | "buildinfo" => Ok(Command::BuildInfo),
            "getParameter" => Ok(Command::GetParameter),
            "serverStatus" => Ok(Command::ServerStatus),
            "listDatabases" => Ok(Command::ListDatabases),
            "listCollections" => Ok(Command::ListCollections {
                db: database(request)?,
            }),
            "dropDatabase" => Ok(Command::DropDatabase {
                db: database(request)?,
            }),
            "create" => Ok(Command::Create {
                ns: namespace(request, name)?,
            }),
            "drop" => Ok(Command::Drop {
                ns: namespace(request, name)?,
            }),
            "insert" => Ok(Command::Insert {
                ns: namespace(request, name)?,
                documents: documents(request)?,
            }),
            "find" => Ok(Command::Find {
                ns: namespace(request, name)?,
                filter: optional_document(request, "filter")?,
                sort: optional_document(request, "sort")?,
                skip: skip(request)?,
                limit: limit(request)?,
            }),
            "count" => Ok(Command::Count {
                ns: namespace(request, name)?,
                query: optional_document(request, "query")?,
            }),
            other => Err(CommandError::CommandNotFound(other.to_string())),
        }
    }
}

fn database(request: &Document) -> Result<String, CommandError> {
    match request.get("$db") {
        Some(Bson::String(db)) if !db.is_empty() => Ok(db.clone()),
        Some(Bson::String(_)) => Err(CommandError::bad_value("Invalid empty database name")),
        Some(other) => Err(CommandError::bad_value(format!(
            "$db must be a string, found {:?}",
            other.element_type()
        ))),
        None => Err(CommandError::bad_value("no $db field in request")),
    }
}

fn namespace(request: &Document, command: &str) -> Result<Namespace, CommandError> {
    let db = database(request)?;
    match request.get(command) {
        Some(Bson::String(coll)) if !coll.is_empty() => Ok(Namespace::new(db, coll.as_str())),
        Some(Bson::String(_)) => Err(CommandError::bad_value(format!(
            "Invalid namespace specified '{db}.'"
        ))),
        other => Err(CommandError::bad_value(format!(
            "collection name has invalid type {:?}",
            other.map(Bson::element_type)
        ))),
    }
}

fn optional_document(request: &Document, key: &str) -> Result<Document, CommandError> {
    match request.get(key) {
        None | Some(Bson::Null) => Ok(Document::new()),
        Some(Bson::Document(d)) => Ok(d.clone()),
        Some(other) => Err(CommandError::bad_value(format!(
            "\"{key}\" had the wrong type. Expected object, found {:?}",
            other.element_type()
        ))),
    }
}

fn documents(request: &Document) -> Result<Vec<Document>, CommandError> {
    let Some(Bson::Array(items)) = request.get("documents") else {
        return Err(CommandError::bad_value("\"documents\" must be an array"));
    };
    items
        .iter()
        .map(|item| match item {
            Bson::Document(d) => Ok(d.clone()),
            other => Err(CommandError::bad_value(format!(
                "\"documents\" entries must be objects, found {:?}",
                other.element_type()
            ))),
        })
        .collect()
}

fn whole_number(request: &Document, key: &str) -> Result<Option<i64>, CommandError> {
    match request.get(key) {
        None | Some(Bson::Null) => Ok(None),
        Some(Bson::Int32(n)) => Ok(Some(i64::from(*n))),
        Some(Bson::Int64(n)) => Ok(Some(*n)),
        Some(Bson::Double(f)) if f.is_finite() && f.fract() == 0.0 => Ok(Some(*f as i64)),
        Some(other) => Err(CommandError::bad_value(format!(
            "\"{key}\" must be a whole number, found {other}"
        ))),
    }
}

fn skip(request: &Document) -> Result<usize, CommandError> {
    match whole_number(request, "skip")? {
        None => Ok(0),
        Some(n) if n < 0 => Err(CommandError::bad_value(format!(
            "Skip value must be non-negative, but received: {n}"
        ))),
        Some(n) => Ok(usize::try_from(n).unwrap_or(usize::MAX)),
    }
}

/// A negative limit means the same as its absolute value here: there is
/// only ever one batch.
fn limit(request: &Document) -> Result<usize, CommandError> {
    let n = whole_number(request, "limit")?.unwrap_or(0);
    Ok(usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX))
}
