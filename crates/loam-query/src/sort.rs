use std::borrow::Borrow;
use std::cmp::Ordering;

use bson::{Bson, Document};

use crate::compare::total_order;
use crate::error::QueryError;
use crate::value::resolve_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

/// Parse sort keys like `{ "last_name": 1, "actor_id": -1 }`.
pub fn parse_sort(keys: &Document) -> Result<Vec<Sort>, QueryError> {
    keys.iter()
        .map(|(field, value)| {
            let direction = match value {
                Bson::Int32(1) | Bson::Int64(1) => SortDirection::Asc,
                Bson::Int32(-1) | Bson::Int64(-1) => SortDirection::Desc,
                Bson::Double(f) if *f == 1.0 => SortDirection::Asc,
                Bson::Double(f) if *f == -1.0 => SortDirection::Desc,
                other => {
                    return Err(QueryError::bad_value(format!(
                        "invalid sort direction for field '{field}': {other}"
                    )));
                }
            };
            Ok(Sort {
                field: field.clone(),
                direction,
            })
        })
        .collect()
}

/// Compare two documents under a list of sort keys; ties fall through to
/// the next key.
pub fn compare_documents(a: &Document, b: &Document, sorts: &[Sort]) -> Ordering {
    for sort in sorts {
        let ord = total_order(resolve_path(a, &sort.field), resolve_path(b, &sort.field));
        let ord = match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Stable in-place sort.
pub fn apply_sort<D: Borrow<Document>>(docs: &mut [D], sorts: &[Sort]) {
    if sorts.is_empty() {
        return;
    }
    docs.sort_by(|a, b| compare_documents(a.borrow(), b.borrow(), sorts));
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn parses_directions() {
        let sorts = parse_sort(&doc! { "a": 1_i32, "b": -1_i64, "c": 1.0 }).unwrap();
        assert_eq!(
            sorts,
            vec![
                Sort {
                    field: "a".into(),
                    direction: SortDirection::Asc,
                },
                Sort {
                    field: "b".into(),
                    direction: SortDirection::Desc,
                },
                Sort {
                    field: "c".into(),
                    direction: SortDirection::Asc,
                },
            ]
        );
    }

    #[test]
    fn rejects_other_directions() {
        for bad in [doc! { "a": 2_i32 }, doc! { "a": "asc" }, doc! { "a": 0.5 }] {
            match parse_sort(&bad) {
                Err(QueryError::BadValue(msg)) => assert!(msg.contains("'a'"), "{msg}"),
                other => panic!("expected BadValue, got {other:?}"),
            }
        }
    }

    #[test]
    fn multi_key_sort_is_stable() {
        let mut docs = vec![
            doc! { "last": "B", "id": 1_i32 },
            doc! { "last": "A", "id": 2_i32 },
            doc! { "last": "B", "id": 3_i64 },
            doc! { "id": 4_i32 },
        ];
        let sorts = parse_sort(&doc! { "last": 1_i32, "id": -1_i32 }).unwrap();
        apply_sort(&mut docs, &sorts);
        let ids: Vec<i64> = docs
            .iter()
            .map(|d| match d.get("id") {
                Some(Bson::Int32(n)) => i64::from(*n),
                Some(Bson::Int64(n)) => *n,
                other => panic!("unexpected id {other:?}"),
            })
            .collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }

    #[test]
    fn numbers_sort_before_strings() {
        let mut docs = vec![doc! { "v": "a" }, doc! { "v": 10.5 }, doc! { "v": 2_i32 }];
        let sorts = [Sort {
            field: "v".into(),
            direction: SortDirection::Asc,
        }];
        apply_sort(&mut docs, &sorts);
        assert_eq!(docs[0], doc! { "v": 2_i32 });
        assert_eq!(docs[2], doc! { "v": "a" });
    }
}
