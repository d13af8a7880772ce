//! Operator I/O for the CLI
//!
//! - Input: JSON queries on stdin, one per line
//! - Output: JSON responses on stdout, one per line
//! - Logs never go to stdout

use std::io::{self, BufReader, Stdin, Stdout, Write};

use crate::frontend::JsonLinesFrontend;

use super::errors::CliResult;

/// Operator front end over the process's stdin and stdout
pub fn operator_frontend() -> JsonLinesFrontend<BufReader<Stdin>, Stdout> {
    JsonLinesFrontend::new(BufReader::new(io::stdin()), io::stdout())
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });

    let mut stdout = io::stdout();
    writeln!(stdout, "{}", response)?;
    stdout.flush()?;

    Ok(())
}
