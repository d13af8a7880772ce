//! Query descriptor
//!
//! A query is a closed sum type. Every consumer matches it exhaustively;
//! there is no fall-through for an unrecognized type.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A request descriptor issued by the Root and consumed by every process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Query {
    /// Terminate every process in the cluster
    Exit,
    /// All sales within an inclusive date range, globally sorted by date
    SalesByDate {
        /// First day of the range (inclusive)
        start: NaiveDate,
        /// Last day of the range (inclusive)
        end: NaiveDate,
    },
    /// Total sales per company
    SalesByCompany,
}

/// Discriminant of a query, without its conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Exit,
    SalesByDate,
    SalesByCompany,
}

impl QueryKind {
    /// Returns the wire discriminant
    pub fn code(&self) -> u8 {
        match self {
            QueryKind::Exit => 0,
            QueryKind::SalesByDate => 1,
            QueryKind::SalesByCompany => 2,
        }
    }

    /// Parse a wire discriminant
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(QueryKind::Exit),
            1 => Some(QueryKind::SalesByDate),
            2 => Some(QueryKind::SalesByCompany),
            _ => None,
        }
    }

    /// Returns the name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Exit => "exit",
            QueryKind::SalesByDate => "sales_by_date",
            QueryKind::SalesByCompany => "sales_by_company",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Query {
    /// Create a date-range query
    pub fn sales_by_date(start: NaiveDate, end: NaiveDate) -> Self {
        Query::SalesByDate { start, end }
    }

    /// Returns the query discriminant
    pub fn kind(&self) -> QueryKind {
        match self {
            Query::Exit => QueryKind::Exit,
            Query::SalesByDate { .. } => QueryKind::SalesByDate,
            Query::SalesByCompany => QueryKind::SalesByCompany,
        }
    }

    /// Whether this query terminates the cluster
    pub fn is_exit(&self) -> bool {
        matches!(self, Query::Exit)
    }

    /// Validate query conditions before the query enters the cluster.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Query::SalesByDate { start, end } if start > end => Err(format!(
                "start date {} is after end date {}",
                start, end
            )),
            _ => Ok(()),
        }
    }
}
