//! Loader integration tests.
//!
//! The first test runs against the in-memory client; the second loads a
//! small export into a live cluster and reads it back.

use super::test_cluster_config;
use scylla_kit::db::{self, MockCqlClient};
use scylla_kit::loader::{Compression, LoadOptions, Loader, SchemaPlan, TableLayout};
use std::io::Write;

const EXPORT: &[&str] = &[
    r#"{"row_key":"user#1","cells":[{"family":"profile","qual":"name","ts_micros":1700000000000000,"value_b64":"YWxpY2U="},{"family":"stats","qual":"visits","ts_micros":1700000000000000,"value_b64":"AAAAAAAAACo="}]}"#,
    r#"{"row_key":"user#2","cells":[{"family":"profile","qual":"name","ts_micros":1700000001000000,"value_b64":"Ym9i"}]}"#,
    r#"{"row_key":"user#3""#,
];

fn write_export() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for line in EXPORT {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_load_with_mock_client_and_report() {
    let export = write_export();
    let schema = SchemaPlan::new("bt", None, Compression::Lz4, TableLayout::Single).unwrap();
    let client = MockCqlClient::new();

    let mut loader = Loader::new(&client, LoadOptions::new(export.path(), schema));
    loader.prepare_schema().await.unwrap();
    let stats = loader.run(std::future::pending()).await.unwrap();

    assert_eq!(stats.total_records, 2);
    assert_eq!(stats.total_cells, 3);
    assert_eq!(stats.error_count, 1);
    assert_eq!(client.inserted().len(), 3);

    let report = stats.render_report();
    assert!(report.contains("Total Records Processed: 2"));
    assert!(report.contains("profile: 2 cells"));
    assert!(report.contains("Malformed JSON on line 3"));
}

#[tokio::test]
async fn test_load_into_cluster() {
    let Some(config) = test_cluster_config() else {
        eprintln!("Skipping test: SCYLLA_TEST_HOST not set");
        return;
    };

    let export = write_export();
    let schema = SchemaPlan::new(
        "scylla_kit_it",
        Some("cells_it"),
        Compression::Zstd,
        TableLayout::Single,
    )
    .unwrap()
    .with_replication_factor(1);
    let mut options = LoadOptions::new(export.path(), schema);
    options.drop_table = true;

    let client = db::connect(&config).await.unwrap();
    let mut loader = Loader::new(client.as_ref(), options);
    loader.prepare_schema().await.unwrap();
    let stats = loader.run(std::future::pending()).await.unwrap();
    assert_eq!(stats.failed_inserts, 0);

    let value = client
        .query_text("SELECT value_b64 FROM scylla_kit_it.cells_it WHERE row_key = 'user#2'")
        .await
        .unwrap();
    assert_eq!(value.as_deref(), Some("Ym9i"));

    client.execute("DROP TABLE IF EXISTS scylla_kit_it.cells_it").await.unwrap();
    client.close().await.unwrap();
}
