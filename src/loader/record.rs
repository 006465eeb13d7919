//! Bigtable export records and the cell rows derived from them.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;

/// One line of a Bigtable JSON export.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BigtableRecord {
    #[serde(default)]
    pub row_key: Option<String>,
    #[serde(default)]
    pub cells: Vec<BigtableCell>,
}

/// One versioned cell of a record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BigtableCell {
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub qual: Option<String>,
    #[serde(default)]
    pub ts_micros: i64,
    #[serde(default)]
    pub value_b64: String,
}

/// A flattened cell, ready to be bound to an insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRow {
    pub row_key: String,
    pub family: String,
    pub qualifier: String,
    pub timestamp_micros: i64,
    pub value_b64: String,
}

impl CellRow {
    /// Cell timestamp in milliseconds, `None` when the export carried none.
    pub fn timestamp_millis(&self) -> Option<i64> {
        (self.timestamp_micros > 0).then(|| self.timestamp_micros / 1000)
    }
}

impl BigtableRecord {
    /// Flattens the record into one row per cell.
    ///
    /// `line_number` names rows whose export lost the row key.
    pub fn into_cell_rows(self, line_number: usize) -> Vec<CellRow> {
        let row_key = self
            .row_key
            .unwrap_or_else(|| format!("unknown_{line_number}"));

        self.cells
            .into_iter()
            .map(|cell| CellRow {
                row_key: row_key.clone(),
                family: cell.family.unwrap_or_else(|| "unknown".to_string()),
                qualifier: cell.qual.unwrap_or_else(|| "unknown".to_string()),
                timestamp_micros: cell.ts_micros,
                value_b64: cell.value_b64,
            })
            .collect()
    }
}

/// Renders a base64 cell value for humans.
///
/// Eight-byte values are Bigtable counters (big-endian u64); other values
/// are shown as UTF-8 when valid and as lowercase hex otherwise. Input that
/// is not base64 is returned unchanged.
pub fn decode_value(value_b64: &str) -> String {
    let bytes = match STANDARD.decode(value_b64) {
        Ok(bytes) => bytes,
        Err(_) => return value_b64.to_string(),
    };

    if let Ok(counter) = <[u8; 8]>::try_from(bytes.as_slice()) {
        return u64::from_be_bytes(counter).to_string();
    }

    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e
            .as_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect(),
    }
}
