//! CSV export of the first records of an export, for spot checks.

use super::reader::{ReadItem, RecordReader};
use super::record::{decode_value, CellRow};
use crate::error::Result;
use chrono::{DateTime, SecondsFormat};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::info;

const HEADER: &str = "row_key,family,qualifier,timestamp,timestamp_micros,value_b64,decoded_value";

/// Returns `input` with its extension replaced by `csv`.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("csv")
}

/// Writes the cells of the first `sample_size` records of `input` to `output`.
///
/// Returns the number of cell rows written.
pub async fn export_sample(input: &Path, output: &Path, sample_size: usize) -> Result<usize> {
    info!(
        "Exporting sample of {} records to {}",
        sample_size,
        output.display()
    );

    let mut reader = RecordReader::open(input).await?;
    let mut writer = BufWriter::new(File::create(output).await?);
    writer.write_all(format!("{HEADER}\n").as_bytes()).await?;

    let mut records = 0;
    let mut written = 0;
    while records < sample_size {
        let Some(item) = reader.next_item().await? else {
            break;
        };
        if let ReadItem::Record {
            record,
            line_number,
        } = item
        {
            for row in record.into_cell_rows(line_number) {
                let line = csv_line(&row) + "\n";
                writer.write_all(line.as_bytes()).await?;
                written += 1;
            }
            records += 1;
        }
    }
    writer.flush().await?;

    info!("Sample data exported to {} ({} rows)", output.display(), written);
    Ok(written)
}

fn csv_line(row: &CellRow) -> String {
    let timestamp = if row.timestamp_micros > 0 {
        DateTime::from_timestamp_micros(row.timestamp_micros)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Micros, true))
            .unwrap_or_default()
    } else {
        String::new()
    };

    [
        csv_field(&row.row_key),
        csv_field(&row.family),
        csv_field(&row.qualifier),
        timestamp,
        row.timestamp_micros.to_string(),
        csv_field(&row.value_b64),
        csv_field(&decode_value(&row.value_b64)),
    ]
    .join(",")
}

/// Quotes a field when it contains a delimiter, a quote or a line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
