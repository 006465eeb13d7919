//! Streaming loader for Bigtable JSON exports.
//!
//! Records are read line by line, flattened into cell rows and written in
//! batches through a prepared statement with bounded concurrency. Batches are
//! kept per target table so the per-family layout can route each cell.

mod reader;
pub mod record;
pub mod sample;
pub mod schema;
pub mod stats;

pub use reader::{ReadItem, RecordReader};
pub use record::{BigtableCell, BigtableRecord, CellRow};
pub use schema::{Compression, SchemaPlan, TableLayout};
pub use stats::LoadStats;

use crate::db::{CqlClient, Param, ParamRow};
use crate::error::{KitError, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Tuning and target of one load.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub file: PathBuf,
    pub schema: SchemaPlan,
    pub drop_table: bool,
    pub batch_size: usize,
    pub concurrency: usize,
    pub progress_interval: usize,
}

impl LoadOptions {
    pub fn new(file: impl Into<PathBuf>, schema: SchemaPlan) -> Self {
        Self {
            file: file.into(),
            schema,
            drop_table: false,
            batch_size: 100,
            concurrency: 50,
            progress_interval: 1000,
        }
    }
}

/// Pending rows for one table.
struct Batch {
    statement: String,
    rows: Vec<ParamRow>,
}

/// Drives one load against a CQL client.
pub struct Loader<'a> {
    client: &'a dyn CqlClient,
    options: LoadOptions,
    stats: LoadStats,
    batches: BTreeMap<String, Batch>,
    created_tables: HashSet<String>,
    /// Tables whose creation failed, with the reason; never retried.
    failed_tables: HashMap<String, String>,
}

impl<'a> Loader<'a> {
    pub fn new(client: &'a dyn CqlClient, options: LoadOptions) -> Self {
        Self {
            client,
            options,
            stats: LoadStats::default(),
            batches: BTreeMap::new(),
            created_tables: HashSet::new(),
            failed_tables: HashMap::new(),
        }
    }

    /// Creates the keyspace and, for the single layout, the table.
    pub async fn prepare_schema(&mut self) -> Result<()> {
        let schema = &self.options.schema;
        self.client.execute(&schema.create_keyspace()).await?;
        info!("Keyspace {} ready", schema.keyspace);

        if schema.layout == TableLayout::Single {
            if self.options.drop_table {
                info!("Dropping table {}.{} (if exists)", schema.keyspace, schema.table);
                self.client.execute(&schema.drop_table()).await?;
            }
            self.client.execute(&schema.create_table("")).await?;
            self.created_tables.insert(schema.table.clone());
            info!(
                "Table {}.{} ready (compression {})",
                schema.keyspace, schema.table, schema.compression
            );
        }
        Ok(())
    }

    /// Streams the input file into the cluster until end of input or until
    /// `shutdown` resolves, then flushes every pending batch.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> Result<LoadStats> {
        info!("Starting streaming processing of {}", self.options.file.display());
        let start = Instant::now();
        let mut reader = RecordReader::open(&self.options.file).await?;
        tokio::pin!(shutdown);

        loop {
            let item = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Processing interrupted by user");
                    self.stats.interrupted = true;
                    break;
                }
                item = reader.next_item() => item,
            };
            let item = match item {
                Ok(Some(item)) => item,
                Ok(None) => break,
                Err(e) => {
                    error!("Reading {} failed: {}", self.options.file.display(), e);
                    self.flush_all().await;
                    return Err(e);
                }
            };

            match item {
                ReadItem::Malformed { message, .. } => {
                    warn!("{}", message);
                    self.stats.record_error(message);
                }
                ReadItem::Record {
                    record,
                    line_number,
                } => {
                    let rows = record.into_cell_rows(line_number);
                    self.stats.record_cells(&rows);
                    if let Err(e) = self.add_rows(rows).await {
                        error!("Error processing record on line {}: {}", line_number, e);
                        self.stats
                            .record_error(format!("Record on line {line_number}: {e}"));
                    }

                    let processed = self.stats.total_records;
                    if self.options.progress_interval > 0
                        && processed % self.options.progress_interval as u64 == 0
                    {
                        let elapsed = start.elapsed().as_secs_f64().max(f64::EPSILON);
                        info!(
                            "Processed {} records ({:.1} records/sec) - {:.1}% complete",
                            processed,
                            processed as f64 / elapsed,
                            reader.progress()
                        );
                    }
                }
            }
        }

        self.flush_all().await;
        self.stats.elapsed = start.elapsed();

        info!("Total records processed: {}", self.stats.total_records);
        info!("Total cells processed: {}", self.stats.total_cells);
        info!("Total errors: {}", self.stats.error_count);
        info!("Failed inserts: {}", self.stats.failed_inserts);
        info!("Total time: {:.2} seconds", self.stats.elapsed.as_secs_f64());
        info!("Average rate: {:.2} records/sec", self.stats.rate());

        Ok(self.stats)
    }

    /// Queues every row of one record. A row whose table is unavailable is
    /// counted as a failed insert and the remaining rows still go through;
    /// the first error is returned.
    async fn add_rows(&mut self, rows: Vec<CellRow>) -> Result<()> {
        let mut first_error = None;
        for row in rows {
            let table = self.options.schema.table_for(&row.family);
            if let Err(e) = self.ensure_table(&table, &row.family).await {
                self.stats.failed_inserts += 1;
                first_error.get_or_insert(e);
                continue;
            }

            let params = self.bind(&row);
            let batch = self.batches.entry(table.clone()).or_insert_with(|| Batch {
                statement: self.options.schema.insert(&row.family),
                rows: Vec::new(),
            });
            batch.rows.push(params);

            if batch.rows.len() >= self.options.batch_size {
                if let Err(e) = self.flush(&table).await {
                    first_error.get_or_insert(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn ensure_table(&mut self, table: &str, family: &str) -> Result<()> {
        if self.created_tables.contains(table) {
            return Ok(());
        }
        if let Some(reason) = self.failed_tables.get(table) {
            return Err(KitError::query(format!("Table {table} unavailable: {reason}")));
        }

        let schema = &self.options.schema;
        let created = match schema.check_table_name(table) {
            Ok(()) => {
                info!(
                    "Creating table {}.{} with compression {}",
                    schema.keyspace, table, schema.compression
                );
                self.client.execute(&schema.create_table(family)).await
            }
            Err(e) => Err(e),
        };

        match created {
            Ok(()) => {
                self.created_tables.insert(table.to_string());
                Ok(())
            }
            Err(e) => {
                warn!("Cannot create table {}: {}", table, e);
                self.failed_tables.insert(table.to_string(), e.to_string());
                Err(e)
            }
        }
    }

    fn bind(&self, row: &CellRow) -> ParamRow {
        match self.options.schema.layout {
            TableLayout::Single => vec![
                Param::Text(row.row_key.clone()),
                Param::Text(row.family.clone()),
                Param::Text(row.qualifier.clone()),
                row.timestamp_millis().map_or(Param::Null, Param::Timestamp),
                Param::BigInt(row.timestamp_micros),
                Param::Text(row.value_b64.clone()),
            ],
            // timestamp is a clustering column here and cannot be null
            TableLayout::PerFamily => vec![
                Param::Text(row.row_key.clone()),
                Param::Text(row.qualifier.clone()),
                Param::Timestamp(row.timestamp_millis().unwrap_or(0)),
                Param::Text(row.value_b64.clone()),
            ],
        }
    }

    /// Inserts and clears the batch for `table`.
    async fn flush(&mut self, table: &str) -> Result<()> {
        let Some(batch) = self.batches.get_mut(table) else {
            return Ok(());
        };
        if batch.rows.is_empty() {
            return Ok(());
        }
        let rows = std::mem::take(&mut batch.rows);
        let statement = batch.statement.clone();
        let count = rows.len();

        match self
            .client
            .insert_rows(&statement, rows, self.options.concurrency)
            .await
        {
            Ok(outcome) => {
                debug!("Inserted batch of {} rows into {}", outcome.applied, table);
                if outcome.failed > 0 {
                    warn!("{} of {} inserts into {} failed", outcome.failed, count, table);
                    self.stats.failed_inserts += outcome.failed as u64;
                    for message in outcome.errors {
                        self.stats.record_error(format!("Insert into {table}: {message}"));
                    }
                }
                Ok(())
            }
            Err(e) => {
                self.stats.failed_inserts += count as u64;
                Err(e)
            }
        }
    }

    /// Flushes every pending batch, logging failures instead of stopping.
    async fn flush_all(&mut self) {
        let tables: Vec<String> = self.batches.keys().cloned().collect();
        for table in tables {
            if let Err(e) = self.flush(&table).await {
                error!("Batch insert failed for {}: {}", table, e);
                self.stats.record_error(format!("Final flush of {table}: {e}"));
            }
        }
    }
}
