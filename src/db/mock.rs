//! Mock CQL clients for testing.
//!
//! Provides in-memory implementations that record every statement so the
//! probe and the loader can be exercised without a cluster.

use super::{CqlClient, InsertOutcome, ParamRow};
use crate::error::{KitError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// A mock client that answers from canned text results and stores inserts.
#[derive(Default)]
pub struct MockCqlClient {
    texts: HashMap<String, String>,
    failing_rows: HashSet<String>,
    failing_statements: Vec<String>,
    executed: Mutex<Vec<String>>,
    inserted: Mutex<Vec<(String, ParamRow)>>,
}

impl MockCqlClient {
    /// Creates a new mock client with no canned results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `cql` with `value` in `query_text`.
    pub fn with_text(mut self, cql: &str, value: &str) -> Self {
        self.texts.insert(cql.to_string(), value.to_string());
        self
    }

    /// Makes every insert whose first bound value is `Text(key)` fail.
    pub fn failing_row_key(mut self, key: &str) -> Self {
        self.failing_rows.insert(key.to_string());
        self
    }

    /// Makes `execute` fail for every statement containing `fragment`.
    pub fn failing_statement(mut self, fragment: &str) -> Self {
        self.failing_statements.push(fragment.to_string());
        self
    }

    /// Returns every statement seen by `query_text` and `execute`, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Returns every inserted row with the statement it was bound to.
    pub fn inserted(&self) -> Vec<(String, ParamRow)> {
        self.inserted.lock().map(|v| v.clone()).unwrap_or_default()
    }

    fn record(&self, cql: &str) {
        if let Ok(mut executed) = self.executed.lock() {
            executed.push(cql.to_string());
        }
    }
}

#[async_trait]
impl CqlClient for MockCqlClient {
    async fn query_text(&self, cql: &str) -> Result<Option<String>> {
        self.record(cql);
        Ok(self.texts.get(cql).cloned())
    }

    async fn execute(&self, cql: &str) -> Result<()> {
        self.record(cql);
        if self.failing_statements.iter().any(|f| cql.contains(f.as_str())) {
            return Err(KitError::query("mock statement rejected"));
        }
        Ok(())
    }

    async fn insert_rows(
        &self,
        statement: &str,
        rows: Vec<ParamRow>,
        _concurrency: usize,
    ) -> Result<InsertOutcome> {
        let mut outcome = InsertOutcome::default();
        let mut inserted = self
            .inserted
            .lock()
            .map_err(|_| KitError::internal("mock insert log poisoned"))?;

        for row in rows {
            let rejected = matches!(
                row.first(),
                Some(super::Param::Text(key)) if self.failing_rows.contains(key)
            );
            if rejected {
                outcome.record_failure("mock write rejected");
            } else {
                outcome.applied += 1;
                inserted.push((statement.to_string(), row));
            }
        }
        Ok(outcome)
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A mock client whose every call fails with the given connection message.
pub struct FailingCqlClient {
    message: String,
}

impl FailingCqlClient {
    /// Creates a client that fails with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn fail<T>(&self) -> Result<T> {
        Err(KitError::connection(self.message.clone()))
    }
}

#[async_trait]
impl CqlClient for FailingCqlClient {
    async fn query_text(&self, _cql: &str) -> Result<Option<String>> {
        self.fail()
    }

    async fn execute(&self, _cql: &str) -> Result<()> {
        self.fail()
    }

    async fn insert_rows(
        &self,
        _statement: &str,
        _rows: Vec<ParamRow>,
        _concurrency: usize,
    ) -> Result<InsertOutcome> {
        self.fail()
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
