//! Keyspace and table layout for loaded Bigtable data.

use crate::error::{KitError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// SSTable compression applied to created tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    Zstd,
    Lz4,
    None,
}

impl Compression {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zstd => "zstd",
            Self::Lz4 => "lz4",
            Self::None => "none",
        }
    }

    /// Body of the `compression = { ... }` table option.
    pub fn options(&self) -> &'static str {
        match self {
            Self::Zstd => "'sstable_compression': 'ZstdCompressor'",
            Self::Lz4 => "'sstable_compression': 'org.apache.cassandra.io.compress.LZ4Compressor'",
            Self::None => "'sstable_compression': ''",
        }
    }
}

impl FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zstd" => Ok(Self::Zstd),
            "lz4" => Ok(Self::Lz4),
            "none" => Ok(Self::None),
            _ => Err(format!(
                "Invalid compression mode: {s}. Expected: zstd, lz4, or none"
            )),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How cells are spread over tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableLayout {
    /// Every cell in one table keyed by row, family, timestamp and qualifier.
    #[default]
    Single,
    /// One table per column family.
    PerFamily,
}

/// Target keyspace and tables of a load.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaPlan {
    pub keyspace: String,
    pub table: String,
    pub compression: Compression,
    pub replication_factor: u32,
    pub tablets: bool,
    pub layout: TableLayout,
}

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]{0,47}$").expect("valid regex"))
}

fn invalid_chars_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid regex"))
}

/// Maps a column family name to a legal table-name suffix.
///
/// Illegal characters become `_`; names that do not start with a letter get
/// an `f_` prefix.
pub fn sanitize_table_name(name: &str) -> String {
    let sanitized = invalid_chars_regex().replace_all(name, "_").into_owned();
    if sanitized
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
    {
        sanitized
    } else {
        format!("f_{sanitized}")
    }
}

fn validate_identifier(kind: &str, name: &str) -> Result<()> {
    if identifier_regex().is_match(name) {
        Ok(())
    } else {
        Err(KitError::input(format!(
            "Invalid {kind} name '{name}': use a letter followed by up to 47 letters, digits or underscores"
        )))
    }
}

impl SchemaPlan {
    /// Creates a plan, validating the keyspace and table names.
    ///
    /// Without an explicit table name the single layout uses
    /// `table_w_{compression}` and the per-family layout uses `table`.
    pub fn new(
        keyspace: &str,
        table: Option<&str>,
        compression: Compression,
        layout: TableLayout,
    ) -> Result<Self> {
        let table = match (table, layout) {
            (Some(t), _) => t.to_string(),
            (None, TableLayout::Single) => format!("table_w_{compression}"),
            (None, TableLayout::PerFamily) => "table".to_string(),
        };
        validate_identifier("keyspace", keyspace)?;
        validate_identifier("table", &table)?;

        Ok(Self {
            keyspace: keyspace.to_string(),
            table,
            compression,
            replication_factor: 3,
            tablets: true,
            layout,
        })
    }

    pub fn with_replication_factor(mut self, rf: u32) -> Self {
        self.replication_factor = rf;
        self
    }

    pub fn with_tablets(mut self, enabled: bool) -> Self {
        self.tablets = enabled;
        self
    }

    pub fn create_keyspace(&self) -> String {
        format!(
            "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'NetworkTopologyStrategy', 'replication_factor': {}}} AND tablets = {{'enabled': {}}}",
            self.keyspace, self.replication_factor, self.tablets
        )
    }

    /// Table that receives cells of `family`.
    pub fn table_for(&self, family: &str) -> String {
        match self.layout {
            TableLayout::Single => self.table.clone(),
            TableLayout::PerFamily => format!("{}_{}", self.table, sanitize_table_name(family)),
        }
    }

    /// Checks a derived table name against the identifier rules.
    pub fn check_table_name(&self, table: &str) -> Result<()> {
        validate_identifier("table", table)
    }

    pub fn drop_table(&self) -> String {
        format!("DROP TABLE IF EXISTS {}.{}", self.keyspace, self.table)
    }

    /// DDL for the table holding `family` (ignored by the single layout).
    pub fn create_table(&self, family: &str) -> String {
        let compression = self.compression.options();
        match self.layout {
            TableLayout::Single => format!(
                "CREATE TABLE IF NOT EXISTS {}.{} (row_key text, family text, qualifier text, timestamp timestamp, timestamp_micros bigint, value_b64 text, PRIMARY KEY (row_key, family, timestamp_micros, qualifier)) WITH compression = {{{compression}}}",
                self.keyspace, self.table
            ),
            TableLayout::PerFamily => format!(
                "CREATE TABLE IF NOT EXISTS {}.{} (row_key text, qualifier text, timestamp timestamp, raw_value text, PRIMARY KEY (row_key, timestamp, qualifier)) WITH CLUSTERING ORDER BY (timestamp DESC, qualifier ASC) AND compression = {{{compression}}}",
                self.keyspace,
                self.table_for(family)
            ),
        }
    }

    /// Insert statement for the table holding `family`.
    pub fn insert(&self, family: &str) -> String {
        match self.layout {
            TableLayout::Single => format!(
                "INSERT INTO {}.{} (row_key, family, qualifier, timestamp, timestamp_micros, value_b64) VALUES (?, ?, ?, ?, ?, ?)",
                self.keyspace, self.table
            ),
            TableLayout::PerFamily => format!(
                "INSERT INTO {}.{} (row_key, qualifier, timestamp, raw_value) VALUES (?, ?, ?, ?)",
                self.keyspace,
                self.table_for(family)
            ),
        }
    }
}
