//! Value and outcome types shared by the CQL clients.

use serde::{Deserialize, Serialize};

/// A bound value for a prepared statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Param {
    /// `text` / `varchar`.
    Text(String),

    /// `bigint`.
    BigInt(i64),

    /// `timestamp`, as milliseconds since the Unix epoch.
    Timestamp(i64),

    /// Unset column, bound as CQL null.
    Null,
}

/// One row of bound values, in statement order.
pub type ParamRow = Vec<Param>;

/// Number of error messages kept per insert call.
const MAX_KEPT_ERRORS: usize = 10;

/// Result of executing one prepared statement over many rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Rows the cluster acknowledged.
    pub applied: usize,

    /// Rows that failed.
    pub failed: usize,

    /// A sample of the failure messages.
    pub errors: Vec<String>,
}

impl InsertOutcome {
    /// Records one failed row.
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.failed += 1;
        if self.errors.len() < MAX_KEPT_ERRORS {
            self.errors.push(message.into());
        }
    }

    /// Folds another outcome into this one.
    pub fn absorb(&mut self, other: InsertOutcome) {
        self.applied += other.applied;
        self.failed += other.failed;
        for message in other.errors {
            if self.errors.len() >= MAX_KEPT_ERRORS {
                break;
            }
            self.errors.push(message);
        }
    }
}
