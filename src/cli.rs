//! Command-line argument parsing for scylla-kit.

use crate::cloud::{CloudProvider, ScalingMode};
use crate::config::ClusterConfig;
use crate::loader::Compression;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line toolkit for ScyllaDB clusters.
#[derive(Parser, Debug)]
#[command(name = "scylla-kit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG is used when unset
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to a cluster and print its release version
    Version(ConnectionArgs),

    /// Manage clusters through the ScyllaDB Cloud API
    Cloud {
        #[command(subcommand)]
        action: CloudAction,
    },

    /// Stream a Bigtable JSON Lines export into a cluster
    LoadJson(LoadArgs),
}

/// Cluster connection flags shared by the commands that open a session.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Comma-separated contact points (host or host:port)
    #[arg(short = 's', long, value_name = "HOSTS")]
    pub hosts: Option<String>,

    /// CQL port for contact points without one
    #[arg(short = 'P', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Local datacenter name
    #[arg(long = "dc", value_name = "DC")]
    pub datacenter: Option<String>,

    /// Username
    #[arg(short = 'u', long, value_name = "USER")]
    pub username: Option<String>,

    /// Password
    #[arg(short = 'p', long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Use named connection from config
    #[arg(short = 'c', long, value_name = "NAME")]
    pub connection: Option<String>,

    /// Connection timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub connect_timeout: Option<u64>,
}

impl ConnectionArgs {
    /// Converts CLI arguments to a ClusterConfig.
    ///
    /// Returns None when no connection flag was given, so file and
    /// environment settings apply untouched.
    pub fn to_cluster_config(&self) -> Option<ClusterConfig> {
        if self.hosts.is_none()
            && self.port.is_none()
            && self.datacenter.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.connect_timeout.is_none()
        {
            return None;
        }

        Some(ClusterConfig {
            hosts: self
                .hosts
                .as_deref()
                .map(ClusterConfig::parse_hosts)
                .unwrap_or_default(),
            port: self.port,
            datacenter: self.datacenter.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            connect_timeout_secs: self.connect_timeout,
        })
    }

    /// Returns the named connection to use, if specified.
    pub fn connection_name(&self) -> Option<&str> {
        self.connection.as_deref()
    }
}

#[derive(Subcommand, Debug)]
pub enum CloudAction {
    /// List the account's clusters
    List,

    /// Print one cluster's details as JSON
    Show {
        /// Cluster id
        cluster_id: String,
    },

    /// Delete a cluster
    Delete {
        /// Cluster id
        cluster_id: String,

        /// Cluster name, required by the API as confirmation
        cluster_name: String,

        /// Skip the interactive confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Create a cluster on GCP or AWS
    Create(CreateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Cloud provider (gcp or aws)
    pub provider: CloudProvider,

    /// Scaling mode (xcloud or standard)
    #[arg(default_value = "xcloud")]
    pub mode: ScalingMode,

    /// Prefix of the generated cluster name
    #[arg(long, default_value = "scylla-kit")]
    pub name_prefix: String,

    /// Instance type instead of the provider default
    #[arg(long, value_name = "TYPE")]
    pub instance_type: Option<String>,

    /// Region instead of the provider default
    #[arg(long)]
    pub region: Option<String>,

    /// ScyllaDB version to deploy
    #[arg(long, default_value = crate::cloud::plan::DEFAULT_SCYLLA_VERSION)]
    pub scylla_version: String,

    /// Print the request without submitting it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Path to the input JSON Lines file
    #[arg(short = 'f', long, default_value = "input.json")]
    pub file: PathBuf,

    /// Target keyspace
    #[arg(short = 'k', long, default_value = "bigtable")]
    pub keyspace: String,

    /// Target table (per-family layout: table name prefix)
    #[arg(short = 't', long)]
    pub table: Option<String>,

    /// Compression (zstd, lz4 or none)
    #[arg(short = 'M', long, default_value = "zstd")]
    pub mode: Compression,

    /// Keyspace replication factor
    #[arg(long, default_value_t = 3)]
    pub replication_factor: u32,

    /// Create the keyspace with tablets disabled
    #[arg(long)]
    pub no_tablets: bool,

    /// Drop the target table before loading
    #[arg(long)]
    pub drop_table: bool,

    /// Write each column family to its own table
    #[arg(long)]
    pub split_families: bool,

    /// Rows per insert batch
    #[arg(short = 'b', long, default_value_t = 100)]
    pub batch_size: usize,

    /// Maximum in-flight inserts
    #[arg(long, default_value_t = 50)]
    pub concurrency: usize,

    /// Log progress every N records
    #[arg(short = 'i', long, default_value_t = 1000)]
    pub progress_interval: usize,

    /// Analysis report path
    #[arg(long, default_value = "streaming_analysis_report.txt")]
    pub report: PathBuf,

    /// Also export a CSV sample next to the input file
    #[arg(short = 'x', long)]
    pub export_csv: bool,

    /// Records in the CSV sample
    #[arg(long, default_value_t = 5000)]
    pub sample_size: usize,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_args(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_parse_version_defaults() {
        let cli = parse_args(&["scylla-kit", "version"]);
        match cli.command {
            Command::Version(conn) => {
                assert!(conn.to_cluster_config().is_none());
                assert_eq!(conn.connection_name(), None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_version_flags() {
        let cli = parse_args(&[
            "scylla-kit",
            "version",
            "-s",
            "10.0.0.1,10.0.0.2",
            "-P",
            "19042",
            "--dc",
            "GCE_US_WEST_1",
            "-u",
            "scylla",
            "-p",
            "secret",
        ]);
        let Command::Version(conn) = cli.command else {
            panic!("expected version command");
        };
        let config = conn.to_cluster_config().unwrap();

        assert_eq!(config.hosts, vec!["10.0.0.1", "10.0.0.2"]);
        assert_eq!(config.port, Some(19042));
        assert_eq!(config.datacenter.as_deref(), Some("GCE_US_WEST_1"));
        assert_eq!(config.username.as_deref(), Some("scylla"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.connect_timeout_secs, None);
    }

    #[test]
    fn test_parse_named_connection() {
        let cli = parse_args(&["scylla-kit", "version", "-c", "prod"]);
        let Command::Version(conn) = cli.command else {
            panic!("expected version command");
        };
        assert_eq!(conn.connection_name(), Some("prod"));
        assert!(conn.to_cluster_config().is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse_args(&[
            "scylla-kit",
            "version",
            "--config",
            "/etc/kit.toml",
            "--log",
            "debug",
        ]);
        assert_eq!(cli.config_path(), PathBuf::from("/etc/kit.toml"));
        assert_eq!(cli.log.as_deref(), Some("debug"));
    }

    #[test]
    fn test_parse_cloud_delete() {
        let cli = parse_args(&["scylla-kit", "cloud", "delete", "123", "demo", "--yes"]);
        match cli.command {
            Command::Cloud {
                action:
                    CloudAction::Delete {
                        cluster_id,
                        cluster_name,
                        yes,
                    },
            } => {
                assert_eq!(cluster_id, "123");
                assert_eq!(cluster_name, "demo");
                assert!(yes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_cloud_create() {
        let cli = parse_args(&["scylla-kit", "cloud", "create", "gcp"]);
        let Command::Cloud {
            action: CloudAction::Create(args),
        } = cli.command
        else {
            panic!("expected cloud create");
        };
        assert_eq!(args.provider, CloudProvider::Gcp);
        assert_eq!(args.mode, ScalingMode::Xcloud);
        assert_eq!(args.name_prefix, "scylla-kit");
        assert_eq!(args.scylla_version, "2025.3.3");
        assert!(!args.dry_run);

        let cli = parse_args(&["scylla-kit", "cloud", "create", "aws", "standard", "--dry-run"]);
        let Command::Cloud {
            action: CloudAction::Create(args),
        } = cli.command
        else {
            panic!("expected cloud create");
        };
        assert_eq!(args.provider, CloudProvider::Aws);
        assert_eq!(args.mode, ScalingMode::Standard);
        assert!(args.dry_run);
    }

    #[test]
    fn test_parse_cloud_create_rejects_unknown_provider() {
        assert!(Cli::try_parse_from(["scylla-kit", "cloud", "create", "azure"]).is_err());
    }

    #[test]
    fn test_parse_load_json_defaults() {
        let cli = parse_args(&["scylla-kit", "load-json"]);
        let Command::LoadJson(args) = cli.command else {
            panic!("expected load-json");
        };
        assert_eq!(args.file, PathBuf::from("input.json"));
        assert_eq!(args.keyspace, "bigtable");
        assert_eq!(args.table, None);
        assert_eq!(args.mode, Compression::Zstd);
        assert_eq!(args.replication_factor, 3);
        assert_eq!(args.batch_size, 100);
        assert_eq!(args.concurrency, 50);
        assert_eq!(args.progress_interval, 1000);
        assert_eq!(args.sample_size, 5000);
        assert!(!args.export_csv);
        assert!(!args.split_families);
    }

    #[test]
    fn test_parse_load_json_flags() {
        let cli = parse_args(&[
            "scylla-kit",
            "load-json",
            "-s",
            "node-0",
            "-f",
            "export.json",
            "-M",
            "lz4",
            "-b",
            "4000",
            "-x",
            "--split-families",
            "--no-tablets",
        ]);
        let Command::LoadJson(args) = cli.command else {
            panic!("expected load-json");
        };
        assert_eq!(args.connection.hosts.as_deref(), Some("node-0"));
        assert_eq!(args.file, PathBuf::from("export.json"));
        assert_eq!(args.mode, Compression::Lz4);
        assert_eq!(args.batch_size, 4000);
        assert!(args.export_csv);
        assert!(args.split_families);
        assert!(args.no_tablets);
    }
}
