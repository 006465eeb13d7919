//! ScyllaDB / Cassandra client implementation.
//!
//! Provides the `ScyllaClient` struct that implements the `CqlClient` trait
//! on top of the `scylla` driver's session.

use crate::config::ClusterConfig;
use crate::db::{CqlClient, InsertOutcome, Param, ParamRow};
use crate::error::{KitError, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use scylla::client::execution_profile::ExecutionProfile;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use scylla::policies::load_balancing::DefaultPolicy;
use scylla::statement::Consistency;
use scylla::value::{CqlTimestamp, CqlValue};
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum number of connection retry attempts.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay between retry attempts (doubles each retry).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Query timeout in seconds.
const QUERY_TIMEOUT_SECS: u64 = 30;

/// CQL client backed by a driver session.
pub struct ScyllaClient {
    session: Session,
}

impl ScyllaClient {
    /// Creates a new ScyllaClient from an existing session.
    pub fn from_session(session: Session) -> Self {
        Self { session }
    }

    /// Connects to the cluster, retrying transient failures with backoff.
    pub async fn connect(config: &ClusterConfig) -> Result<Self> {
        let mut last_error = String::new();
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);

        for attempt in 1..=MAX_RETRY_ATTEMPTS {
            debug!("Connection attempt {} of {}", attempt, MAX_RETRY_ATTEMPTS);

            match session_builder(config).build().await {
                Ok(session) => {
                    debug!("Connected to {}", config.display_string());
                    return Ok(Self { session });
                }
                Err(e) => {
                    last_error = e.to_string();
                    let transient = is_transient_error(&last_error);

                    if attempt < MAX_RETRY_ATTEMPTS && transient {
                        warn!(
                            "Connection attempt {} failed (transient error), retrying in {:?}",
                            attempt, delay
                        );
                        tokio::time::sleep(delay).await;
                        delay *= 2;
                    } else {
                        break;
                    }
                }
            }
        }

        Err(map_connection_error(&last_error, config))
    }
}

/// Builds the driver session configuration: contact points, credentials,
/// timeouts and a token-aware policy preferring the local datacenter.
fn session_builder(config: &ClusterConfig) -> SessionBuilder {
    let mut policy = DefaultPolicy::builder().token_aware(true);
    if let Some(dc) = &config.datacenter {
        policy = policy.prefer_datacenter(dc.clone());
    }

    let profile = ExecutionProfile::builder()
        .load_balancing_policy(policy.build())
        .request_timeout(Some(Duration::from_secs(QUERY_TIMEOUT_SECS)))
        .build();

    let mut builder = SessionBuilder::new()
        .known_nodes(config.contact_points())
        .connection_timeout(config.connect_timeout())
        .default_execution_profile_handle(profile.into_handle());

    if let Some(user) = &config.username {
        builder = builder.user(user.as_str(), config.password.as_deref().unwrap_or_default());
    }

    builder
}

fn to_cql_value(param: &Param) -> Option<CqlValue> {
    match param {
        Param::Text(s) => Some(CqlValue::Text(s.clone())),
        Param::BigInt(v) => Some(CqlValue::BigInt(*v)),
        Param::Timestamp(millis) => Some(CqlValue::Timestamp(CqlTimestamp(*millis))),
        Param::Null => None,
    }
}

#[async_trait]
impl CqlClient for ScyllaClient {
    async fn query_text(&self, cql: &str) -> Result<Option<String>> {
        let result = self
            .session
            .query_unpaged(cql, ())
            .await
            .map_err(|e| KitError::query(e.to_string()))?;

        let rows = result
            .into_rows_result()
            .map_err(|e| KitError::query(format!("Statement returned no rows: {e}")))?;

        let first = rows
            .maybe_first_row::<(Option<String>,)>()
            .map_err(|e| KitError::query(format!("Unexpected result shape: {e}")))?;

        Ok(first.and_then(|(value,)| value))
    }

    async fn execute(&self, cql: &str) -> Result<()> {
        debug!("Executing: {}", cql.trim());
        self.session
            .query_unpaged(cql, ())
            .await
            .map_err(|e| KitError::query(e.to_string()))?;
        Ok(())
    }

    async fn insert_rows(
        &self,
        statement: &str,
        rows: Vec<ParamRow>,
        concurrency: usize,
    ) -> Result<InsertOutcome> {
        let mut prepared = self
            .session
            .prepare(statement)
            .await
            .map_err(|e| KitError::query(format!("Failed to prepare statement: {e}")))?;
        prepared.set_consistency(Consistency::One);

        let session = &self.session;
        let prepared = &prepared;
        let results: Vec<_> = stream::iter(rows.into_iter().map(|row| {
            let values: Vec<Option<CqlValue>> = row.iter().map(to_cql_value).collect();
            async move { session.execute_unpaged(prepared, values).await }
        }))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

        let mut outcome = InsertOutcome::default();
        for result in results {
            match result {
                Ok(_) => outcome.applied += 1,
                Err(e) => outcome.record_failure(e.to_string()),
            }
        }
        Ok(outcome)
    }

    async fn close(&self) -> Result<()> {
        // The session releases its connections when dropped.
        Ok(())
    }
}

/// Checks if a connection error is transient and worth retrying.
fn is_transient_error(message: &str) -> bool {
    let error_str = message.to_lowercase();

    if error_str.contains("authentication")
        || error_str.contains("bad credentials")
        || error_str.contains("unauthorized")
    {
        return false;
    }

    error_str.contains("connection refused")
        || error_str.contains("timed out")
        || error_str.contains("timeout")
        || error_str.contains("unreachable")
        || error_str.contains("connection reset")
        || error_str.contains("broken pipe")
}

/// Maps driver connection errors to user-friendly messages.
fn map_connection_error(message: &str, config: &ClusterConfig) -> KitError {
    let target = config.contact_points().join(",");
    let user = config.username.as_deref().unwrap_or("anonymous");
    let error_str = message.to_lowercase();

    if error_str.contains("authentication") || error_str.contains("bad credentials") {
        KitError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("connection refused") {
        KitError::connection(format!(
            "Cannot connect to {target}. Check that the cluster is running."
        ))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        KitError::connection(format!(
            "Connection to {target} timed out. The cluster may be overloaded or unreachable."
        ))
    } else if error_str.contains("resolve") || error_str.contains("hostname") {
        KitError::connection(format!("Could not resolve any contact point in {target}."))
    } else {
        KitError::connection(message.to_string())
    }
}
