//! Failure propagation tests
//!
//! Tests for cluster-wide failure handling:
//! - A protocol violation on any coordinator aborts the whole cluster
//! - A panicking rank aborts the cluster instead of leaving peers blocked
//! - Receive timeouts surface as communication failures
//! - Bad configuration files are rejected before boot

mod support;

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use paradb::cli::{run_cluster, CliErrorCode};
use paradb::cluster::{launch, ClusterError};
use paradb::coordinator::{wait_for_reply, CoordinatorErrorCode};
use paradb::frontend::{Frontend, FrontendResult};
use paradb::model::{Query, Row};
use paradb::topology::{ClusterTopology, Role};
use paradb::transport::LocalCluster;
use paradb::worker::SalesTable;
use tempfile::TempDir;

use support::{date, quiet_config, run_session, silence_logs, ScriptedFrontend};

// =============================================================================
// Protocol violations
// =============================================================================

/// Workers disagree on the company catalog: the cluster aborts and no
/// result is delivered.
#[test]
fn test_catalog_mismatch_aborts_cluster() {
    let tables = vec![
        SalesTable::new(Vec::new(), 3),
        SalesTable::new(Vec::new(), 4),
        SalesTable::new(Vec::new(), 3),
    ];

    let (result, frontend) = run_session(tables, vec![Query::SalesByCompany]);
    let err = result.unwrap_err();

    assert!(matches!(err, ClusterError::Aborted { .. }));
    assert!(err.to_string().contains("PARADB_PROTOCOL_VIOLATION"));
    assert!(frontend.delivered.is_empty());
    assert_eq!(frontend.farewells, 0);

    let failed_coordinators = err
        .failures()
        .iter()
        .filter(|f| f.role == Role::Coordinator)
        .count();
    assert_eq!(failed_coordinators, 3);
}

/// Workers abort too: none is left waiting for the next query.
#[test]
fn test_abort_reaches_workers() {
    let tables = vec![SalesTable::new(Vec::new(), 1), SalesTable::new(Vec::new(), 2)];
    let (result, _) = run_session(tables, vec![Query::SalesByCompany]);
    let err = result.unwrap_err();

    let failed_workers: Vec<usize> = err
        .failures()
        .iter()
        .filter(|f| f.role == Role::Worker)
        .map(|f| f.rank)
        .collect();
    assert_eq!(failed_workers, vec![1, 3]);
}

// =============================================================================
// Panics
// =============================================================================

struct PanickingFrontend;

impl Frontend for PanickingFrontend {
    fn next_query(&mut self) -> FrontendResult<Query> {
        panic!("operator console crashed");
    }

    fn deliver(&mut self, _query: &Query, _rows: &[Row]) -> FrontendResult<()> {
        Ok(())
    }

    fn farewell(&mut self) -> FrontendResult<()> {
        Ok(())
    }
}

/// The Root panics before broadcasting; blocked peers are released.
#[test]
fn test_panicking_root_aborts_cluster() {
    silence_logs();
    let config = quiet_config(2);
    let tables = vec![SalesTable::new(Vec::new(), 1), SalesTable::new(Vec::new(), 1)];
    let mut frontend = PanickingFrontend;

    let err = launch(&config, tables, &mut frontend).unwrap_err();
    let failures = err.failures();
    assert_eq!(failures.len(), 4);
    assert!(failures[0].message.contains("panicked"));
}

// =============================================================================
// Timeouts
// =============================================================================

/// A coordinator whose worker never replies fails with a comm error.
#[test]
fn test_missing_reply_times_out() {
    let cluster = LocalCluster::with_recv_timeout(2, Duration::from_millis(50));
    let topology = ClusterTopology::new(Arc::new(cluster.endpoint(0).unwrap())).unwrap();

    let err = wait_for_reply(&topology).unwrap_err();
    assert_eq!(err.code(), CoordinatorErrorCode::CommFailed);
    assert!(err.is_fatal());
}

// =============================================================================
// Configuration
// =============================================================================

/// Invalid configuration is rejected before any rank starts.
#[test]
fn test_invalid_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("paradb.json");
    fs::write(&path, r#"{"coordinators": 0}"#).unwrap();

    let mut frontend = ScriptedFrontend::new(vec![Query::SalesByCompany]);
    let err = run_cluster(&path, &mut frontend).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::ConfigError);
    assert_eq!(frontend.farewells, 0);
}

/// A configured timeout is carried into the cluster and does not disturb a
/// healthy session.
#[test]
fn test_config_with_timeout_runs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("paradb.json");
    fs::write(
        &path,
        r#"{"coordinators": 2, "rows_per_worker": 10, "recv_timeout_ms": 5000, "log_level": "fatal"}"#,
    )
    .unwrap();

    let query = Query::sales_by_date(date(2020, 1, 1), date(2023, 12, 31));
    let mut frontend = ScriptedFrontend::new(vec![query]);
    let report = run_cluster(&path, &mut frontend).unwrap();

    assert_eq!(frontend.delivered[0].1.len(), 20);
    assert_eq!(report.worker_replies, vec![1, 1]);
}
