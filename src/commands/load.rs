//! `load-json`: stream a Bigtable export into a cluster.

use super::resolve_connection;
use crate::cli::LoadArgs;
use crate::config::Config;
use crate::db;
use crate::error::{KitError, Result};
use crate::loader::{sample, LoadOptions, Loader, SchemaPlan, TableLayout};
use std::io::Write;
use tracing::{error, info, warn};

/// Builds the load options from the command line.
pub fn load_options(args: &LoadArgs) -> Result<LoadOptions> {
    if args.batch_size == 0 {
        return Err(KitError::input("--batch-size must be greater than 0"));
    }
    if args.concurrency == 0 {
        return Err(KitError::input("--concurrency must be greater than 0"));
    }

    let layout = if args.split_families {
        TableLayout::PerFamily
    } else {
        TableLayout::Single
    };
    let schema = SchemaPlan::new(&args.keyspace, args.table.as_deref(), args.mode, layout)?
        .with_replication_factor(args.replication_factor)
        .with_tablets(!args.no_tablets);

    let mut options = LoadOptions::new(&args.file, schema);
    options.drop_table = args.drop_table;
    options.batch_size = args.batch_size;
    options.concurrency = args.concurrency;
    options.progress_interval = args.progress_interval;
    Ok(options)
}

/// Runs the load, writes the report and prints the summary.
pub async fn run(args: &LoadArgs, config: &Config, out: &mut impl Write) -> Result<()> {
    let options = load_options(args)?;
    if !options.file.exists() {
        return Err(KitError::input(format!(
            "Input file not found: {}",
            options.file.display()
        )));
    }

    let cluster = resolve_connection(&args.connection, config)?;
    info!("Connecting to {}", cluster.display_string());
    let client = db::connect(&cluster).await?;

    let result = load_and_report(client.as_ref(), options, args, out).await;
    client.close().await?;
    result
}

async fn load_and_report(
    client: &dyn db::CqlClient,
    options: LoadOptions,
    args: &LoadArgs,
    out: &mut impl Write,
) -> Result<()> {
    let mut loader = Loader::new(client, options);
    loader.prepare_schema().await?;
    let stats = loader.run(shutdown_signal()).await?;

    let mut generated = Vec::new();
    match stats.write_report(&args.report) {
        Ok(()) => {
            info!("Analysis report saved to {}", args.report.display());
            generated.push(args.report.clone());
        }
        Err(e) => error!("Failed to write report {}: {}", args.report.display(), e),
    }

    if args.export_csv {
        let csv_path = sample::default_output_path(&args.file);
        match sample::export_sample(&args.file, &csv_path, args.sample_size).await {
            Ok(rows) => {
                info!("Sample CSV export complete: {} cells", rows);
                generated.push(csv_path);
            }
            Err(e) => error!("CSV export failed: {}", e),
        }
    }

    write!(out, "{}", stats.render_summary())?;
    if !generated.is_empty() {
        writeln!(out, "\nGenerated files:")?;
        for path in &generated {
            writeln!(out, "  - {}", path.display())?;
        }
    }
    Ok(())
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use crate::db::MockCqlClient;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn load_args(extra: &[&str]) -> LoadArgs {
        let mut argv = vec!["scylla-kit", "load-json"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Command::LoadJson(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_load_options_from_args() {
        let args = load_args(&[
            "-k",
            "ks",
            "-M",
            "lz4",
            "--replication-factor",
            "1",
            "--no-tablets",
            "-b",
            "10",
        ]);
        let options = load_options(&args).unwrap();
        assert_eq!(options.schema.keyspace, "ks");
        assert_eq!(options.schema.table, "table_w_lz4");
        assert_eq!(options.schema.replication_factor, 1);
        assert!(!options.schema.tablets);
        assert_eq!(options.schema.layout, TableLayout::Single);
        assert_eq!(options.batch_size, 10);
    }

    #[test]
    fn test_split_families_layout() {
        let args = load_args(&["--split-families", "-t", "events"]);
        let options = load_options(&args).unwrap();
        assert_eq!(options.schema.layout, TableLayout::PerFamily);
        assert_eq!(options.schema.table_for("cf1"), "events_cf1");
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        let err = load_options(&load_args(&["-b", "0"])).unwrap_err();
        assert_eq!(err.category(), "Input Error");
        let err = load_options(&load_args(&["--concurrency", "0"])).unwrap_err();
        assert_eq!(err.category(), "Input Error");
    }

    #[test]
    fn test_rejects_invalid_keyspace() {
        let err = load_options(&load_args(&["-k", "bad-name"])).unwrap_err();
        assert_eq!(err.category(), "Input Error");
    }

    #[tokio::test]
    async fn test_missing_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let args = load_args(&["-f", missing.to_str().unwrap()]);
        let mut out = Vec::new();
        let err = run(&args, &Config::default(), &mut out).await.unwrap_err();
        assert!(err.to_string().contains("Input file not found"));
    }

    #[tokio::test]
    async fn test_load_and_report_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("export.json");
        std::fs::write(
            &input,
            r#"{"row_key":"r1","cells":[{"family":"cf","qual":"q","ts_micros":1000,"value_b64":"aGk="}]}
"#,
        )
        .unwrap();
        let report = dir.path().join("report.txt");
        let args = load_args(&[
            "-f",
            input.to_str().unwrap(),
            "--report",
            report.to_str().unwrap(),
            "-x",
        ]);

        let client = MockCqlClient::new();
        let mut out = Vec::new();
        load_and_report(&client, load_options(&args).unwrap(), &args, &mut out)
            .await
            .unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("STREAMING PROCESSING COMPLETE!"));
        assert!(printed.contains("Total Records: 1"));
        assert!(printed.contains("Generated files:"));
        assert!(report.exists());
        assert!(dir.path().join("export.csv").exists());
        assert_eq!(client.inserted().len(), 1);
    }
}
