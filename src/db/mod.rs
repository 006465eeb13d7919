//! CQL access layer for scylla-kit.
//!
//! Provides a trait-based interface over the cluster session so the version
//! probe and the loader can run against the real driver or an in-memory mock.

mod mock;
mod session;
mod types;

pub use mock::{FailingCqlClient, MockCqlClient};
pub use session::ScyllaClient;
pub use types::{InsertOutcome, Param, ParamRow};

use crate::config::ClusterConfig;
use crate::error::{KitError, Result};
use async_trait::async_trait;

/// Query whose single column reports the server version.
pub const RELEASE_VERSION_QUERY: &str = "SELECT release_version FROM system.local";

/// Opens a session to the cluster described by `config`.
///
/// The returned client owns the session; dropping it releases every
/// connection, so callers get scoped release on both success and error paths.
pub async fn connect(config: &ClusterConfig) -> Result<Box<dyn CqlClient>> {
    let client = ScyllaClient::connect(config).await?;
    Ok(Box::new(client))
}

/// Reads the cluster's `release_version` from `system.local`.
pub async fn release_version(client: &dyn CqlClient) -> Result<String> {
    client
        .query_text(RELEASE_VERSION_QUERY)
        .await?
        .ok_or_else(|| KitError::query("no release_version returned by system.local"))
}

/// Trait defining the interface for CQL clients.
///
/// All operations are async and return Results with KitError.
#[async_trait]
pub trait CqlClient: Send + Sync {
    /// Runs a query and returns the first column of the first row as text.
    ///
    /// `Ok(None)` means the query produced no row, or the value was null.
    async fn query_text(&self, cql: &str) -> Result<Option<String>>;

    /// Executes a statement whose result is not needed (DDL, single writes).
    async fn execute(&self, cql: &str) -> Result<()>;

    /// Prepares `statement` once and executes it for every row, keeping at most
    /// `concurrency` requests in flight. Per-row failures are counted, not raised.
    async fn insert_rows(
        &self,
        statement: &str,
        rows: Vec<ParamRow>,
        concurrency: usize,
    ) -> Result<InsertOutcome>;

    /// Closes the session.
    async fn close(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_release_version_reads_first_column() {
        let client = MockCqlClient::new().with_text(RELEASE_VERSION_QUERY, "2025.3.3");
        let version = release_version(&client).await.unwrap();
        assert_eq!(version, "2025.3.3");
        assert_eq!(client.executed(), vec![RELEASE_VERSION_QUERY.to_string()]);
    }

    #[tokio::test]
    async fn test_release_version_without_row_is_query_error() {
        let client = MockCqlClient::new();
        let err = release_version(&client).await.unwrap_err();
        assert_eq!(err.category(), "Query Error");
        assert!(err.to_string().contains("release_version"));
    }

    #[tokio::test]
    async fn test_release_version_propagates_driver_error() {
        let client = FailingCqlClient::new("Authentication failed: bad credentials");
        let err = release_version(&client).await.unwrap_err();
        assert!(err.to_string().contains("bad credentials"));
    }
}
