//! Sales row record

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One sales record.
///
/// `company_id` is dense and small-ranged; the per-company reduction uses
/// `company_id - 1` directly as a slot index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Company identifier, starting at 1
    pub company_id: u32,
    /// Sale date
    pub date: NaiveDate,
    /// Sales amount
    pub sales_total: f64,
}

impl Row {
    /// Create a new row
    pub fn new(company_id: u32, date: NaiveDate, sales_total: f64) -> Self {
        Self {
            company_id,
            date,
            sales_total,
        }
    }

    /// Create an aggregate slot for a company with no meaningful date.
    pub fn company_slot(company_id: u32, sales_total: f64) -> Self {
        Self {
            company_id,
            date: NaiveDate::default(),
            sales_total,
        }
    }

    /// Linear day number of the sale date.
    ///
    /// Used as the numeric time value for range partitioning.
    pub fn day_number(&self) -> i64 {
        day_number(self.date)
    }
}

/// Linear day number (days from the common era) of a date.
pub fn day_number(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}
