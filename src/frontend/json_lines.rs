//! JSON-lines operator front end
//!
//! - Input: one JSON query object per line
//! - Output: one JSON response object per line
//! - UTF-8 only
//!
//! ```text
//! {"type":"sales_by_date","start":"2021-01-01","end":"2021-03-31"}
//! {"type":"sales_by_company"}
//! {"type":"exit"}
//! ```

use std::io::{BufRead, Write};

use serde_json::json;

use super::errors::FrontendResult;
use super::Frontend;
use crate::model::{Query, Row};
use crate::observability::{Event, Logger};

/// Message shown to the operator on EXIT
pub const FAREWELL: &str = "Thank you for using ParaDB... Good Bye!";

/// Front end reading queries from `input` and writing results to `output`.
///
/// Malformed or invalid lines are answered with an error object and the
/// prompt repeats. End of input is treated as EXIT so the cluster always
/// shuts down.
pub struct JsonLinesFrontend<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> JsonLinesFrontend<R, W> {
    /// Create a front end over the given streams
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Recover the output stream
    pub fn into_output(self) -> W {
        self.output
    }

    fn write_line(&mut self, value: serde_json::Value) -> FrontendResult<()> {
        serde_json::to_writer(&mut self.output, &value)?;
        writeln!(self.output)?;
        self.output.flush()?;
        Ok(())
    }

    fn write_error(&mut self, code: &str, message: &str) -> FrontendResult<()> {
        Logger::warn(Event::QueryRejected.as_str(), &[("reason", message)]);
        self.write_line(json!({
            "status": "error",
            "code": code,
            "message": message
        }))
    }
}

impl<R, W> Frontend for JsonLinesFrontend<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn next_query(&mut self) -> FrontendResult<Query> {
        loop {
            let mut bytes = Vec::new();
            if self.input.read_until(b'\n', &mut bytes)? == 0 {
                return Ok(Query::Exit);
            }
            let line = match String::from_utf8(bytes) {
                Ok(line) => line,
                Err(e) => {
                    self.write_error("PARADB_INVALID_QUERY", &format!("Encoding error: {}", e))?;
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let query: Query = match serde_json::from_str(line.trim()) {
                Ok(query) => query,
                Err(e) => {
                    self.write_error("PARADB_INVALID_QUERY", &format!("JSON error: {}", e))?;
                    continue;
                }
            };

            if let Err(reason) = query.validate() {
                self.write_error("PARADB_INVALID_QUERY", &reason)?;
                continue;
            }

            return Ok(query);
        }
    }

    fn deliver(&mut self, query: &Query, rows: &[Row]) -> FrontendResult<()> {
        self.write_line(json!({
            "status": "ok",
            "data": {
                "query": query,
                "row_count": rows.len(),
                "rows": rows
            }
        }))
    }

    fn farewell(&mut self) -> FrontendResult<()> {
        self.write_line(json!({
            "status": "ok",
            "data": { "message": FAREWELL }
        }))
    }
}
