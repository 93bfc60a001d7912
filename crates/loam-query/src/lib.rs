mod classify;
mod compare;
mod error;
mod eval;
mod filter;
mod operator;
mod parse_filter;
mod sort;
mod types;
mod value;

pub use classify::{Label, classify, classify_bson, is_homogeneous};
pub use compare::{bson_equal, compare_order, total_order, values_equal};
pub use error::QueryError;
pub use eval::matches;
pub use filter::{CompareOp, Membership, Pattern, Predicate};
pub use operator::{LogicalOp, Operator};
pub use parse_filter::parse_filter;
pub use sort::{Sort, SortDirection, apply_sort, compare_documents, parse_sort};
pub use types::{TypeCode, TypeRegistry};
pub use value::{Value, resolve_path, validate_bson, validate_document};
