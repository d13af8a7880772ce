//! Data model shared by coordinators, workers and the operator front end
//!
//! - `Row`: one sales record, immutable once produced by a worker
//! - `Query`: fixed-size request descriptor, transmitted by value
//! - `RowContainer`: owned row sequence with alias-aware release

mod container;
mod query;
mod row;

pub use container::{Released, RowContainer};
pub use query::{Query, QueryKind};
pub use row::{day_number, Row};
