//! Local sales data of one worker

use serde::{Deserialize, Serialize};

use crate::model::{Query, Row};

/// Rows owned by one worker.
///
/// `max_company_id` is the catalog-wide company count. It is the same on
/// every worker, so every per-company answer has the same number of slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesTable {
    rows: Vec<Row>,
    max_company_id: u32,
}

impl SalesTable {
    /// Create a table over `rows` for companies `1..=max_company_id`
    pub fn new(rows: Vec<Row>, max_company_id: u32) -> Self {
        Self {
            rows,
            max_company_id,
        }
    }

    /// Local rows
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Catalog-wide company count
    pub fn max_company_id(&self) -> u32 {
        self.max_company_id
    }

    /// Compute this worker's partial answer.
    ///
    /// - `SalesByDate`: rows with `start <= date <= end`, in storage order
    /// - `SalesByCompany`: one row per company id `1..=max_company_id`, slot
    ///   `i` holding company `i + 1`; rows with an id outside the catalog
    ///   are ignored
    /// - `Exit`: nothing
    pub fn answer(&self, query: &Query) -> Vec<Row> {
        match *query {
            Query::SalesByDate { start, end } => self
                .rows
                .iter()
                .filter(|row| row.date >= start && row.date <= end)
                .copied()
                .collect(),
            Query::SalesByCompany => {
                let mut slots: Vec<Row> = (1..=self.max_company_id)
                    .map(|id| Row::company_slot(id, 0.0))
                    .collect();
                for row in &self.rows {
                    let Some(slot) = (row.company_id as usize).checked_sub(1) else {
                        continue;
                    };
                    if let Some(slot) = slots.get_mut(slot) {
                        slot.sales_total += row.sales_total;
                    }
                }
                slots
            }
            Query::Exit => Vec::new(),
        }
    }
}
