//! Integration tests for scylla-kit.
//!
//! These tests require a running cluster.
//! Set SCYLLA_TEST_HOST environment variable to run them.

pub mod connection_test;
pub mod load_test;

use scylla_kit::config::ClusterConfig;

/// Builds a cluster config from SCYLLA_TEST_* variables, if set.
pub fn test_cluster_config() -> Option<ClusterConfig> {
    let host = std::env::var("SCYLLA_TEST_HOST").ok()?;
    let mut config = ClusterConfig {
        hosts: vec![host],
        port: std::env::var("SCYLLA_TEST_PORT")
            .ok()
            .and_then(|p| p.parse().ok()),
        datacenter: std::env::var("SCYLLA_TEST_DC").ok(),
        ..Default::default()
    };
    config.apply_builtin_defaults();
    Some(config)
}
