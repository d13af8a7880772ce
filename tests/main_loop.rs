//! Coordinator main loop tests
//!
//! Tests for the lockstep loop:
//! - EXIT is forwarded everywhere and acknowledged exactly once
//! - Every non-EXIT query is delivered once, in order
//! - Container storage is released once per block, aliased or not
//! - A coordinator reports sort stages to its checkpoint observer

mod support;

use std::sync::Arc;
use std::thread;

use paradb::coordinator::{Coordinator, LoopPhase};
use paradb::frontend::Frontend;
use paradb::model::{Query, Row};
use paradb::observability::SortCheckpoints;
use paradb::topology::ClusterTopology;
use paradb::transport::LocalCluster;
use paradb::worker::{run_worker, SalesTable};

use support::{
    date, expected_by_company, expected_by_date, multiset, run_session, silence_logs,
    RecordingCheckpoints, ScriptedFrontend,
};

fn small_tables() -> Vec<SalesTable> {
    vec![
        SalesTable::new(
            vec![
                Row::new(1, date(2021, 1, 10), 10.0),
                Row::new(2, date(2021, 2, 10), 20.0),
            ],
            2,
        ),
        SalesTable::new(vec![Row::new(2, date(2021, 3, 10), 5.0)], 2),
        SalesTable::new(
            vec![
                Row::new(1, date(2021, 1, 5), 1.0),
                Row::new(1, date(2021, 12, 5), 2.0),
            ],
            2,
        ),
    ]
}

// =============================================================================
// EXIT short-circuit
// =============================================================================

/// EXIT first: farewell once, nothing delivered, no worker work.
#[test]
fn test_exit_short_circuits() {
    let (result, frontend) = run_session(small_tables(), Vec::new());
    let report = result.unwrap();

    assert_eq!(frontend.farewells, 1);
    assert!(frontend.delivered.is_empty());
    assert_eq!(report.worker_replies, vec![0, 0, 0]);
    for summary in &report.coordinators {
        assert_eq!(summary.queries_completed, 0);
        assert_eq!(summary.rows_collected, 0);
        assert_eq!(summary.storage_released, 0);
    }
}

/// Queries issued after EXIT are never read.
#[test]
fn test_exit_ends_the_session() {
    let queries = vec![Query::SalesByCompany, Query::Exit, Query::SalesByCompany];
    let (result, frontend) = run_session(small_tables(), queries);
    result.unwrap();

    assert_eq!(frontend.delivered.len(), 1);
    assert_eq!(frontend.farewells, 1);
}

// =============================================================================
// Multi-query sessions
// =============================================================================

/// Mixed queries are delivered in order with the right answers.
#[test]
fn test_mixed_session() {
    let tables = small_tables();
    let range = Query::sales_by_date(date(2021, 1, 1), date(2021, 3, 31));
    let by_company = expected_by_company(&tables);
    let by_date = expected_by_date(&tables, date(2021, 1, 1), date(2021, 3, 31));

    let (result, frontend) = run_session(tables, vec![range, Query::SalesByCompany, range]);
    let report = result.unwrap();

    let kinds: Vec<Query> = frontend.delivered.iter().map(|(q, _)| *q).collect();
    assert_eq!(kinds, vec![range, Query::SalesByCompany, range]);

    let totals: Vec<(u32, f64)> = frontend.delivered[1]
        .1
        .iter()
        .map(|r| (r.company_id, r.sales_total))
        .collect();
    assert_eq!(totals, by_company);
    assert_eq!(totals, vec![(1, 13.0), (2, 25.0)]);

    let dates: Vec<_> = frontend.delivered[0].1.iter().map(|r| r.date).collect();
    let expected_dates: Vec<_> = by_date.iter().map(|r| r.date).collect();
    assert_eq!(dates, expected_dates);
    assert_eq!(frontend.delivered[0].1, frontend.delivered[2].1);

    assert_eq!(report.worker_replies, vec![3, 3, 3]);
    let root = report.root().unwrap();
    assert_eq!(root.queries_completed, 3);
    assert_eq!(root.rows_delivered, 4 + 2 + 4);
}

/// A range with no sales still completes with an empty result.
#[test]
fn test_empty_range() {
    let query = Query::sales_by_date(date(1999, 1, 1), date(1999, 12, 31));
    let (result, frontend) = run_session(small_tables(), vec![query]);
    result.unwrap();
    assert!(frontend.delivered[0].1.is_empty());
}

// =============================================================================
// Container lifecycle
// =============================================================================

/// Reduce: the Root frees two blocks, aliasing coordinators free one.
#[test]
fn test_reduce_release_accounting() {
    let (result, _) = run_session(small_tables(), vec![Query::SalesByCompany]);
    let report = result.unwrap();

    assert_eq!(report.coordinators[0].storage_released, 2);
    assert_eq!(report.coordinators[1].storage_released, 1);
    assert_eq!(report.coordinators[2].storage_released, 1);
}

/// Bucket sort: every coordinator holds two independent blocks.
#[test]
fn test_sort_release_accounting() {
    let query = Query::sales_by_date(date(2021, 1, 1), date(2021, 12, 31));
    let (result, _) = run_session(small_tables(), vec![query, query]);
    let report = result.unwrap();

    for summary in &report.coordinators {
        assert_eq!(summary.storage_released, 4);
    }
}

/// Single pair: the sort result aliases the partial.
#[test]
fn test_single_pair_sort_aliases() {
    let tables = vec![SalesTable::new(
        vec![
            Row::new(1, date(2021, 5, 1), 1.0),
            Row::new(1, date(2021, 4, 1), 1.0),
        ],
        1,
    )];
    let query = Query::sales_by_date(date(2021, 1, 1), date(2021, 12, 31));
    let (result, frontend) = run_session(tables, vec![query]);
    let report = result.unwrap();

    assert_eq!(report.coordinators[0].storage_released, 1);
    let dates: Vec<_> = frontend.delivered[0].1.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![date(2021, 4, 1), date(2021, 5, 1)]);
}

// =============================================================================
// Hand-wired coordinators
// =============================================================================

/// Lets every coordinator of a world report into one recorder
struct SharedCheckpoints(Arc<RecordingCheckpoints>);

impl SortCheckpoints for SharedCheckpoints {
    fn post_partition(&self, index: usize, send_counts: &[usize], send_offsets: &[usize]) {
        self.0.post_partition(index, send_counts, send_offsets);
    }

    fn post_exchange(&self, index: usize, recv_counts: &[usize], peer_offsets: &[usize]) {
        self.0.post_exchange(index, recv_counts, peer_offsets);
    }

    fn pre_gather(&self, index: usize, bucket_len: usize) {
        self.0.pre_gather(index, bucket_len);
    }
}

/// A coordinator loop observes every sort stage through its checkpoints.
#[test]
fn test_coordinator_reports_sort_checkpoints() {
    silence_logs();
    let tables = small_tables();
    let tables = &tables[..2];
    let query = Query::sales_by_date(date(2021, 1, 1), date(2021, 12, 31));
    let expected = expected_by_date(tables, date(2021, 1, 1), date(2021, 12, 31));

    let cluster = LocalCluster::new(4);
    let recorder = Arc::new(RecordingCheckpoints::default());
    let mut frontend = ScriptedFrontend::new(vec![query]);

    let mut operator: Option<&mut dyn Frontend> = Some(&mut frontend);
    let phases = thread::scope(|s| {
        let mut coordinators = Vec::new();
        for index in 0..2 {
            let cluster = &cluster;
            let recorder = Arc::clone(&recorder);
            let operator = if index == 0 { operator.take() } else { None };
            coordinators.push(s.spawn(move || {
                let endpoint = cluster.endpoint(index * 2).unwrap();
                let topology = ClusterTopology::new(Arc::new(endpoint)).unwrap();
                let mut coordinator = Coordinator::new(topology)
                    .unwrap()
                    .with_checkpoints(Box::new(SharedCheckpoints(recorder)));
                assert_eq!(coordinator.phase(), LoopPhase::AwaitingQuery);
                coordinator.run(operator).unwrap();
                coordinator.phase()
            }));
        }
        let workers: Vec<_> = tables
            .iter()
            .enumerate()
            .map(|(index, table)| {
                let cluster = &cluster;
                s.spawn(move || {
                    let endpoint = cluster.endpoint(index * 2 + 1).unwrap();
                    let topology = ClusterTopology::new(Arc::new(endpoint)).unwrap();
                    run_worker(&topology, table).unwrap()
                })
            })
            .collect();

        for worker in workers {
            assert_eq!(worker.join().unwrap(), 1);
        }
        coordinators
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert_eq!(phases, vec![LoopPhase::Terminated, LoopPhase::Terminated]);

    let mut partitioned: Vec<usize> = recorder
        .partitions
        .lock()
        .unwrap()
        .iter()
        .map(|(index, _, _)| *index)
        .collect();
    partitioned.sort();
    assert_eq!(partitioned, vec![0, 1]);
    assert_eq!(recorder.exchanges.lock().unwrap().len(), 2);

    let gathered: usize = recorder.gathers.lock().unwrap().iter().map(|(_, len)| len).sum();
    assert_eq!(gathered, expected.len());
    assert_eq!(frontend.delivered.len(), 1);
    assert_eq!(multiset(&frontend.delivered[0].1), multiset(&expected));
}
