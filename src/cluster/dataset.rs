//! Synthetic sales data
//!
//! Each worker's rows come from its own `StdRng`, seeded from the configured
//! seed and the worker index. The same configuration always yields the same
//! tables.

use chrono::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::ClusterConfig;
use crate::model::{day_number, Row};
use crate::worker::SalesTable;

const WORKER_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Generate one table per worker, in worker order.
pub fn generate_tables(config: &ClusterConfig) -> Vec<SalesTable> {
    (0..config.coordinators)
        .map(|worker| generate_table(config, worker))
        .collect()
}

fn generate_table(config: &ClusterConfig, worker: usize) -> SalesTable {
    let seed = config
        .seed
        .wrapping_add((worker as u64 + 1).wrapping_mul(WORKER_SEED_STRIDE));
    let mut rng = StdRng::seed_from_u64(seed);
    let span = day_number(config.dataset_end) - day_number(config.dataset_start);

    let rows = (0..config.rows_per_worker)
        .map(|_| {
            let company_id = rng.gen_range(1..=config.max_company_id);
            let date = config.dataset_start + Duration::days(rng.gen_range(0..=span));
            let cents: u32 = rng.gen_range(100..=500_000);
            Row::new(company_id, date, f64::from(cents) / 100.0)
        })
        .collect();

    SalesTable::new(rows, config.max_company_id)
}
