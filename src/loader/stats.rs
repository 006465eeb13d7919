//! Load statistics and the analysis report.

use super::record::CellRow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

/// Error messages kept in memory; the count keeps growing past this.
const MAX_STORED_ERRORS: usize = 1000;

/// Error messages written to the report.
const MAX_REPORTED_ERRORS: usize = 50;

/// Qualifiers listed in the report.
const TOP_QUALIFIERS: usize = 20;

/// Counters collected while loading.
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    pub total_records: u64,
    pub total_cells: u64,
    pub failed_inserts: u64,
    pub error_count: u64,
    pub family_counts: HashMap<String, u64>,
    pub qualifier_counts: HashMap<String, u64>,
    /// Number of rows keyed by how many distinct families they carried.
    pub families_per_row: BTreeMap<usize, u64>,
    pub errors: Vec<String>,
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl LoadStats {
    /// Accounts for one record's flattened cells.
    pub fn record_cells(&mut self, rows: &[CellRow]) {
        self.total_records += 1;
        self.total_cells += rows.len() as u64;

        let mut families = HashSet::new();
        for row in rows {
            *self.family_counts.entry(row.family.clone()).or_default() += 1;
            *self.qualifier_counts.entry(row.qualifier.clone()).or_default() += 1;
            families.insert(row.family.as_str());
        }
        *self.families_per_row.entry(families.len()).or_default() += 1;
    }

    /// Counts a processing error and keeps its message.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error_count += 1;
        if self.errors.len() < MAX_STORED_ERRORS {
            self.errors.push(message.into());
        }
    }

    /// Families by descending cell count, ties broken by name.
    pub fn sorted_families(&self) -> Vec<(&str, u64)> {
        sorted_counts(&self.family_counts)
    }

    /// The `n` most frequent qualifiers.
    pub fn top_qualifiers(&self, n: usize) -> Vec<(&str, u64)> {
        let mut sorted = sorted_counts(&self.qualifier_counts);
        sorted.truncate(n);
        sorted
    }

    /// Records per second over the whole run.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_records as f64 / secs
        } else {
            0.0
        }
    }

    /// Renders the analysis report.
    pub fn render_report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "STREAMING BIGTABLE DATA ANALYSIS REPORT");
        let _ = writeln!(out, "{}\n", "=".repeat(60));

        let _ = writeln!(out, "Processing Summary:");
        let _ = writeln!(out, "Total Records Processed: {}", self.total_records);
        let _ = writeln!(out, "Total Cells Processed: {}", self.total_cells);
        let _ = writeln!(out, "Processing Errors: {}", self.error_count);
        let _ = writeln!(out, "Failed Inserts: {}", self.failed_inserts);
        if self.total_records > 0 {
            let avg = self.total_cells as f64 / self.total_records as f64;
            let _ = writeln!(out, "Average Cells per Record: {avg:.2}\n");
        }

        let _ = writeln!(out, "COLUMN FAMILY DISTRIBUTION:");
        let _ = writeln!(out, "{}", "-".repeat(40));
        for (family, count) in self.sorted_families() {
            let _ = writeln!(out, "{family}: {count} cells");
        }

        let _ = writeln!(out, "\nTOP {TOP_QUALIFIERS} QUALIFIERS:");
        let _ = writeln!(out, "{}", "-".repeat(40));
        for (qualifier, count) in self.top_qualifiers(TOP_QUALIFIERS) {
            let _ = writeln!(out, "{qualifier}: {count} occurrences");
        }

        if !self.errors.is_empty() {
            let _ = writeln!(out, "\nERRORS ENCOUNTERED:");
            let _ = writeln!(out, "{}", "-".repeat(40));
            for error in self.errors.iter().take(MAX_REPORTED_ERRORS) {
                let _ = writeln!(out, "{error}");
            }
        }

        if !self.families_per_row.is_empty() {
            let _ = writeln!(out, "\nFAMILIES PER ROW DISTRIBUTION:");
            let _ = writeln!(out, "{}", "-".repeat(40));
            for (families, rows) in &self.families_per_row {
                let _ = writeln!(out, "{families} families: {rows} rows");
            }
        }

        out
    }

    /// Writes the analysis report to `path`.
    pub fn write_report(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.render_report())
    }

    /// Short end-of-run summary for stdout.
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", "=".repeat(60));
        if self.interrupted {
            let _ = writeln!(out, "STREAMING PROCESSING INTERRUPTED");
        } else {
            let _ = writeln!(out, "STREAMING PROCESSING COMPLETE!");
        }
        let _ = writeln!(out, "{}", "=".repeat(60));
        let _ = writeln!(out, "Total Records: {}", self.total_records);
        let _ = writeln!(out, "Total Cells: {}", self.total_cells);
        let _ = writeln!(out, "Processing Errors: {}", self.error_count);
        let _ = writeln!(out, "Failed Inserts: {}", self.failed_inserts);
        let _ = writeln!(out, "\nTop Column Families:");
        for (family, count) in self.sorted_families().into_iter().take(5) {
            let _ = writeln!(out, "  {family}: {count} cells");
        }
        out
    }
}

fn sorted_counts(counts: &HashMap<String, u64>) -> Vec<(&str, u64)> {
    let mut sorted: Vec<(&str, u64)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    sorted
}
