#![allow(dead_code)]

use bson::oid::ObjectId;
use bson::{Bson, DateTime, Document, doc};
use loam_db::{Handler, HandlerConfig};
use loam_store::MemoryStore;

pub const DB: &str = "monila";

/// 2020-02-15T09:34:33Z
pub const LAST_UPDATE_MILLIS: i64 = 1_581_759_273_000;

const ACTORS: [(i32, &str, &str); 18] = [
    (1, "PENELOPE", "GUINESS"),
    (2, "NICK", "WAHLBERG"),
    (3, "ED", "CHASE"),
    (4, "JENNIFER", "DAVIS"),
    (5, "JOHNNY", "LOLLOBRIGIDA"),
    (6, "BETTE", "NICHOLSON"),
    (7, "GRACE", "MOSTEL"),
    (8, "MATTHEW", "JOHANSSON"),
    (9, "JOE", "SWANK"),
    (10, "CHRISTIAN", "GABLE"),
    (28, "WOODY", "HOFFMAN"),
    (58, "CHRISTIAN", "AKROYD"),
    (61, "CHRISTIAN", "NEESON"),
    (79, "MAE", "HOFFMAN"),
    (90, "SEAN", "GUINESS"),
    (169, "KENNETH", "HOFFMAN"),
    (179, "ED", "GUINESS"),
    (200, "THORA", "TEMPLE"),
];

pub const ACTOR_COUNT: i32 = ACTORS.len() as i32;

/// Deterministic `_id`: the actor id in bytes 7 and 11.
pub fn actor_oid(id: i32) -> ObjectId {
    let b = id as u8;
    ObjectId::from_bytes([0x61, 0x2e, 0xc2, 0x80, 0, 0, 0, b, 0, 0, 0, b])
}

pub fn actor(id: i32, first: &str, last: &str) -> Document {
    doc! {
        "_id": actor_oid(id),
        "actor_id": id,
        "first_name": first,
        "last_name": last,
        "last_update": DateTime::from_millis(LAST_UPDATE_MILLIS),
    }
}

pub fn actor_by_id(id: i32) -> Document {
    let (_, first, last) = ACTORS
        .iter()
        .find(|(a, _, _)| *a == id)
        .copied()
        .unwrap_or_else(|| panic!("no actor {id}"));
    actor(id, first, last)
}

pub fn handler() -> Handler<MemoryStore> {
    Handler::new(MemoryStore::new(), HandlerConfig::default())
}

/// A handler with the `actor` collection loaded into [`DB`].
pub fn seeded_handler() -> Handler<MemoryStore> {
    let handler = handler();
    let documents: Vec<Bson> = ACTORS
        .iter()
        .map(|(id, first, last)| Bson::Document(actor(*id, first, last)))
        .collect();
    let reply = handler.handle(&doc! {
        "insert": "actor",
        "documents": documents,
        "$db": DB,
    });
    assert_eq!(reply, doc! { "n": ACTOR_COUNT, "ok": 1.0 });
    handler
}

/// Run `find` against the seeded collection and return `firstBatch`.
pub fn find(handler: &Handler<MemoryStore>, mut request: Document) -> Vec<Document> {
    request.insert("$db", DB);
    let reply = handler.handle(&request);
    let cursor = match reply.get_document("cursor") {
        Ok(cursor) => cursor,
        Err(_) => panic!("expected cursor, got {reply:?}"),
    };
    assert_eq!(cursor.get_i64("id").unwrap(), 0);
    cursor
        .get_array("firstBatch")
        .unwrap()
        .iter()
        .map(|d| d.as_document().unwrap().clone())
        .collect()
}

pub fn actor_ids(docs: &[Document]) -> Vec<i32> {
    docs.iter()
        .map(|d| d.get_i32("actor_id").unwrap())
        .collect()
}
