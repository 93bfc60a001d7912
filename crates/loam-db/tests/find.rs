mod common;
use common::*;

use bson::{Regex, doc};

fn regex(pattern: &str, options: &str) -> Regex {
    Regex {
        pattern: pattern.try_into().unwrap(),
        options: options.try_into().unwrap(),
    }
}

// ── Comparison ──────────────────────────────────────────────

#[test]
fn value_lt_gt() {
    let handler = seeded_handler();
    let docs = find(
        &handler,
        doc! {
            "find": "actor",
            "filter": {
                "last_name": "HOFFMAN",
                "actor_id": { "$gt": 50, "$lt": 100 },
            },
        },
    );
    assert_eq!(docs, vec![actor_by_id(79)]);
}

#[test]
fn in_lte_gte() {
    let handler = seeded_handler();
    let docs = find(
        &handler,
        doc! {
            "find": "actor",
            "filter": {
                "last_name": { "$in": ["HOFFMAN"] },
                "actor_id": { "$gte": 50, "$lte": 100 },
            },
        },
    );
    assert_eq!(docs, vec![actor_by_id(79)]);
}

#[test]
fn inclusive_bounds_include_boundary_documents() {
    let handler = seeded_handler();
    let strict = find(
        &handler,
        doc! { "find": "actor", "filter": { "actor_id": { "$gt": 10, "$lt": 79 } } },
    );
    let inclusive = find(
        &handler,
        doc! { "find": "actor", "filter": { "actor_id": { "$gte": 10, "$lte": 79 } } },
    );
    assert_eq!(actor_ids(&strict), vec![28, 58, 61]);
    assert_eq!(actor_ids(&inclusive), vec![10, 28, 58, 61, 79]);
}

#[test]
fn nin_eq_ne() {
    let handler = seeded_handler();
    let docs = find(
        &handler,
        doc! {
            "find": "actor",
            "filter": {
                "last_name": { "$nin": ["NEESON"], "$ne": "AKROYD" },
                "first_name": { "$eq": "CHRISTIAN" },
            },
        },
    );
    assert_eq!(docs, vec![actor_by_id(10)]);
}

#[test]
fn numeric_widths_are_interchangeable() {
    let handler = seeded_handler();
    let docs = find(
        &handler,
        doc! { "find": "actor", "filter": { "actor_id": { "$in": [28_i64, 79.0] } } },
    );
    assert_eq!(actor_ids(&docs), vec![28, 79]);
}

// ── Logical ─────────────────────────────────────────────────

#[test]
fn not() {
    let handler = seeded_handler();
    let docs = find(
        &handler,
        doc! {
            "find": "actor",
            "filter": { "last_name": { "$not": { "$eq": "GUINESS" } } },
            "sort": { "actor_id": 1 },
            "limit": 1,
        },
    );
    assert_eq!(docs, vec![actor_by_id(2)]);
}

#[test]
fn nested_not() {
    let handler = seeded_handler();
    let docs = find(
        &handler,
        doc! {
            "find": "actor",
            "filter": { "last_name": { "$not": { "$not": { "$not": { "$eq": "GUINESS" } } } } },
            "sort": { "actor_id": 1 },
            "limit": 1,
        },
    );
    assert_eq!(docs, vec![actor_by_id(2)]);
}

#[test]
fn and_or() {
    let handler = seeded_handler();
    let docs = find(
        &handler,
        doc! {
            "find": "actor",
            "filter": {
                "$and": [
                    { "first_name": "CHRISTIAN" },
                    { "$or": [{ "last_name": "GABLE" }, { "last_name": "NEESON" }] },
                ]
            },
            "sort": { "actor_id": 1 },
        },
    );
    assert_eq!(actor_ids(&docs), vec![10, 61]);
}

#[test]
fn nor() {
    let handler = seeded_handler();
    let docs = find(
        &handler,
        doc! {
            "find": "actor",
            "filter": {
                "$nor": [
                    { "actor_id": { "$gt": 2 } },
                    { "first_name": "PENELOPE" },
                ]
            },
        },
    );
    assert_eq!(docs, vec![actor_by_id(2)]);
}

// ── Regex ───────────────────────────────────────────────────

#[test]
fn value_regex() {
    let handler = seeded_handler();
    let docs = find(
        &handler,
        doc! {
            "find": "actor",
            "filter": { "last_name": regex("hoffman", "i") },
            "sort": { "actor_id": 1 },
            "limit": 1,
        },
    );
    assert_eq!(docs, vec![actor_by_id(28)]);
}

#[test]
fn regex_operator_forms() {
    let handler = seeded_handler();
    let filters = [
        doc! { "last_name": { "$regex": regex("hoffman", "i") } },
        doc! { "last_name": { "$regex": regex("hoffman", ""), "$options": "i" } },
        doc! { "last_name": { "$regex": "hoffman", "$options": "i" } },
    ];
    for filter in filters {
        let docs = find(
            &handler,
            doc! { "find": "actor", "filter": filter, "sort": { "actor_id": 1 }, "limit": 1 },
        );
        assert_eq!(docs, vec![actor_by_id(28)]);
    }
}

#[test]
fn regex_without_options_is_case_sensitive() {
    let handler = seeded_handler();
    let docs = find(
        &handler,
        doc! { "find": "actor", "filter": { "last_name": { "$regex": "hoffman" } } },
    );
    assert!(docs.is_empty());

    let docs = find(
        &handler,
        doc! {
            "find": "actor",
            "filter": { "last_name": { "$regex": regex("hoffman", "i"), "$options": "" } },
        },
    );
    assert!(docs.is_empty());
}

// ── Sort / skip / limit ─────────────────────────────────────

#[test]
fn sort_descending_with_skip_and_limit() {
    let handler = seeded_handler();
    let docs = find(
        &handler,
        doc! {
            "find": "actor",
            "filter": { "last_name": "GUINESS" },
            "sort": { "actor_id": -1 },
            "skip": 1,
            "limit": 1,
        },
    );
    assert_eq!(actor_ids(&docs), vec![90]);
}

#[test]
fn multi_key_sort() {
    let handler = seeded_handler();
    let docs = find(
        &handler,
        doc! {
            "find": "actor",
            "filter": { "first_name": { "$in": ["CHRISTIAN", "ED"] } },
            "sort": { "first_name": 1, "actor_id": -1 },
        },
    );
    assert_eq!(actor_ids(&docs), vec![61, 58, 10, 179, 3]);
}

#[test]
fn empty_filter_returns_everything_in_insertion_order() {
    let handler = seeded_handler();
    let docs = find(&handler, doc! { "find": "actor" });
    assert_eq!(docs.len(), ACTOR_COUNT as usize);
    assert_eq!(docs[0], actor_by_id(1));
}

#[test]
fn missing_collection_finds_nothing() {
    let handler = seeded_handler();
    let reply = handler.handle(&doc! { "find": "nope", "$db": DB });
    assert_eq!(
        reply,
        doc! {
            "cursor": { "firstBatch": [], "id": 0_i64, "ns": "monila.nope" },
            "ok": 1.0,
        }
    );
}

// ── Errors ──────────────────────────────────────────────────

#[test]
fn malformed_filters_are_bad_value() {
    let handler = seeded_handler();
    let cases = [
        doc! { "last_name": { "$in": "HOFFMAN" } },
        doc! { "last_name": { "$regex": "a", "$options": "x" } },
        doc! { "last_name": { "$bogus": 1 } },
        doc! { "$where": "true" },
        doc! { "$or": [] },
    ];
    for filter in cases {
        let reply = handler.handle(&doc! { "find": "actor", "filter": filter, "$db": DB });
        assert_eq!(reply.get_f64("ok").unwrap(), 0.0, "{reply:?}");
        assert_eq!(reply.get_i32("code").unwrap(), 2, "{reply:?}");
        assert_eq!(reply.get_str("codeName").unwrap(), "BadValue");
    }
}

#[test]
fn unimplemented_type_code_is_not_implemented() {
    let handler = seeded_handler();
    let reply = handler.handle(&doc! {
        "find": "actor",
        "filter": { "actor_id": { "$type": 19 } },
        "$db": DB,
    });
    assert_eq!(
        reply,
        doc! {
            "ok": 0.0,
            "errmsg": "Type code 19 not implemented",
            "code": 238,
            "codeName": "NotImplemented",
        }
    );
}

#[test]
fn type_and_exists_filters() {
    let handler = seeded_handler();
    let docs = find(
        &handler,
        doc! {
            "find": "actor",
            "filter": { "actor_id": { "$type": "int", "$lt": 3 }, "missing": { "$exists": false } },
        },
    );
    assert_eq!(actor_ids(&docs), vec![1, 2]);
}
