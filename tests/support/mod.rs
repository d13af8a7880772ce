//! Shared harness for cluster integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::thread;

use chrono::NaiveDate;

use paradb::cluster::{launch, ClusterConfig, ClusterReport, ClusterResult};
use paradb::coordinator::{aggregate, AggregationObservers, CoordinatorResult};
use paradb::frontend::{Frontend, FrontendResult};
use paradb::model::{Query, Row, RowContainer};
use paradb::observability::{CoordinatorMetrics, Logger, Severity, SortCheckpoints};
use paradb::topology::ClusterTopology;
use paradb::transport::LocalCluster;
use paradb::worker::SalesTable;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// =============================================================================
// Scripted operator
// =============================================================================

/// Front end that replays a fixed list of queries, then EXIT.
#[derive(Debug, Default)]
pub struct ScriptedFrontend {
    queries: Vec<Query>,
    pub delivered: Vec<(Query, Vec<Row>)>,
    pub farewells: usize,
}

impl ScriptedFrontend {
    pub fn new(queries: Vec<Query>) -> Self {
        let mut queries = queries;
        queries.reverse();
        Self {
            queries,
            delivered: Vec::new(),
            farewells: 0,
        }
    }
}

impl Frontend for ScriptedFrontend {
    fn next_query(&mut self) -> FrontendResult<Query> {
        Ok(self.queries.pop().unwrap_or(Query::Exit))
    }

    fn deliver(&mut self, query: &Query, rows: &[Row]) -> FrontendResult<()> {
        self.delivered.push((*query, rows.to_vec()));
        Ok(())
    }

    fn farewell(&mut self) -> FrontendResult<()> {
        self.farewells += 1;
        Ok(())
    }
}

// =============================================================================
// Cluster runs
// =============================================================================

/// Only fatal events reach stderr
pub fn silence_logs() {
    Logger::set_threshold(Severity::Fatal);
}

/// Configuration for a quiet cluster of `coordinators` pairs
pub fn quiet_config(coordinators: usize) -> ClusterConfig {
    ClusterConfig {
        coordinators,
        log_level: "fatal".to_string(),
        ..ClusterConfig::default()
    }
}

/// Boot a cluster over `tables` and replay `queries`
pub fn run_session(
    tables: Vec<SalesTable>,
    queries: Vec<Query>,
) -> (ClusterResult<ClusterReport>, ScriptedFrontend) {
    silence_logs();
    let config = quiet_config(tables.len());
    let mut frontend = ScriptedFrontend::new(queries);
    let result = launch(&config, tables, &mut frontend);
    (result, frontend)
}

// =============================================================================
// Coordinator-only runs
// =============================================================================

/// Checkpoint observer that records what it sees
#[derive(Debug, Default)]
pub struct RecordingCheckpoints {
    pub partitions: Mutex<Vec<(usize, Vec<usize>, Vec<usize>)>>,
    pub exchanges: Mutex<Vec<(usize, Vec<usize>, Vec<usize>)>>,
    pub gathers: Mutex<Vec<(usize, usize)>>,
}

impl SortCheckpoints for RecordingCheckpoints {
    fn post_partition(&self, index: usize, send_counts: &[usize], send_offsets: &[usize]) {
        self.partitions
            .lock()
            .unwrap()
            .push((index, send_counts.to_vec(), send_offsets.to_vec()));
    }

    fn post_exchange(&self, index: usize, recv_counts: &[usize], peer_offsets: &[usize]) {
        self.exchanges
            .lock()
            .unwrap()
            .push((index, recv_counts.to_vec(), peer_offsets.to_vec()));
    }

    fn pre_gather(&self, index: usize, bucket_len: usize) {
        self.gathers.lock().unwrap().push((index, bucket_len));
    }
}

/// Per-coordinator outcome of a direct aggregation run
pub struct AggregationRun {
    pub partials: RowContainer,
    pub result: CoordinatorResult<RowContainer>,
    pub metrics: CoordinatorMetrics,
}

/// Run `aggregate` on every coordinator of a world with one partial per
/// coordinator. Workers are not started; aggregation never talks to them.
pub fn aggregate_partials(
    partials: Vec<Vec<Row>>,
    query: Query,
    checkpoints: &RecordingCheckpoints,
) -> Vec<AggregationRun> {
    let cluster = LocalCluster::new(partials.len() * 2);

    thread::scope(|s| {
        let handles: Vec<_> = partials
            .into_iter()
            .enumerate()
            .map(|(index, rows)| {
                let cluster = &cluster;
                s.spawn(move || {
                    let endpoint = cluster.endpoint(index * 2).unwrap();
                    let topology = ClusterTopology::new(Arc::new(endpoint)).unwrap();
                    let metrics = CoordinatorMetrics::new();
                    let mut partials = RowContainer::from_rows(rows);
                    let observers = AggregationObservers {
                        checkpoints,
                        metrics: &metrics,
                    };
                    let result = aggregate(&topology, &query, &mut partials, &observers);
                    AggregationRun {
                        partials,
                        result,
                        metrics,
                    }
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}

// =============================================================================
// Sequential reference answers
// =============================================================================

/// All rows of all tables within the range, sorted by date
pub fn expected_by_date(tables: &[SalesTable], start: NaiveDate, end: NaiveDate) -> Vec<Row> {
    let mut rows: Vec<Row> = tables
        .iter()
        .flat_map(|t| t.rows().iter().copied())
        .filter(|r| r.date >= start && r.date <= end)
        .collect();
    rows.sort_by_key(|r| r.date);
    rows
}

/// Per-company totals, summing worker partials in worker order
pub fn expected_by_company(tables: &[SalesTable]) -> Vec<(u32, f64)> {
    let partials: Vec<Vec<Row>> = tables
        .iter()
        .map(|t| t.answer(&Query::SalesByCompany))
        .collect();
    let groups = partials.first().map(Vec::len).unwrap_or(0);
    (0..groups)
        .map(|slot| {
            let total = partials.iter().fold(0.0, |acc, p| acc + p[slot].sales_total);
            (slot as u32 + 1, total)
        })
        .collect()
}

/// Rows as a comparable multiset key
pub fn multiset(rows: &[Row]) -> Vec<(u32, NaiveDate, u64)> {
    let mut keys: Vec<_> = rows
        .iter()
        .map(|r| (r.company_id, r.date, r.sales_total.to_bits()))
        .collect();
    keys.sort();
    keys
}

pub fn is_sorted_by_date(rows: &[Row]) -> bool {
    rows.windows(2).all(|w| w[0].date <= w[1].date)
}
