//! Operator front end
//!
//! Only the Root coordinator talks to the operator. The front end supplies
//! the next query, receives each completed result, and is told once when
//! the cluster shuts down.

mod errors;
mod json_lines;

pub use errors::{FrontendError, FrontendResult};
pub use json_lines::{JsonLinesFrontend, FAREWELL};

use crate::model::{Query, Row};

/// Operator-facing surface of the Root coordinator.
pub trait Frontend: Send {
    /// Block until the operator issues the next valid query.
    fn next_query(&mut self) -> FrontendResult<Query>;

    /// Present the merged result of a completed query.
    fn deliver(&mut self, query: &Query, rows: &[Row]) -> FrontendResult<()>;

    /// Say goodbye after EXIT. Called exactly once.
    fn farewell(&mut self) -> FrontendResult<()>;
}
