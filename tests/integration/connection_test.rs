//! Connection integration tests.
//!
//! Tests cluster connectivity, the release version probe and error handling.

use super::test_cluster_config;
use scylla_kit::config::ClusterConfig;
use scylla_kit::db::{self, ScyllaClient};

#[tokio::test]
async fn test_release_version() {
    let Some(config) = test_cluster_config() else {
        eprintln!("Skipping test: SCYLLA_TEST_HOST not set");
        return;
    };

    let client = db::connect(&config).await.unwrap();
    let version = db::release_version(client.as_ref()).await.unwrap();
    assert!(!version.is_empty());
    assert!(
        version.chars().next().is_some_and(|c| c.is_ascii_digit()),
        "unexpected version: {version}"
    );
    tokio_test::assert_ok!(client.close().await);
}

#[tokio::test]
async fn test_query_text_on_system_table() {
    let Some(config) = test_cluster_config() else {
        eprintln!("Skipping test: SCYLLA_TEST_HOST not set");
        return;
    };

    let client = ScyllaClient::connect(&config).await.unwrap();
    let name = db::CqlClient::query_text(&client, "SELECT cluster_name FROM system.local")
        .await
        .unwrap();
    assert!(name.is_some());
}

#[tokio::test(flavor = "current_thread")]
async fn test_connect_with_invalid_port() {
    let config = ClusterConfig {
        hosts: vec!["127.0.0.1".to_string()],
        port: Some(59999), // Unlikely to be in use
        connect_timeout_secs: Some(2),
        ..Default::default()
    };

    let result = db::connect(&config).await;
    let Err(error) = result else {
        panic!("expected connection failure");
    };
    assert_eq!(error.category(), "Connection Error");
}

#[tokio::test(flavor = "current_thread")]
async fn test_connect_with_unresolvable_host() {
    let config = ClusterConfig {
        hosts: vec!["invalid.host.that.does.not.exist.local".to_string()],
        connect_timeout_secs: Some(2),
        ..Default::default()
    };

    let result = db::connect(&config).await;
    assert!(result.is_err());
}
