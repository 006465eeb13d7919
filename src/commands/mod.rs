//! Command handlers.
//!
//! Each subcommand resolves its configuration, opens whatever session or
//! API client it needs and writes its result to the given output.

pub mod cloud;
pub mod load;
pub mod version;

use crate::cli::ConnectionArgs;
use crate::config::{ClusterConfig, Config};
use crate::error::{KitError, Result};

/// Resolves the final cluster configuration from CLI args, config file, and environment.
///
/// Precedence:
/// 1. CLI arguments (highest)
/// 2. Named connection from config
/// 3. Default connection from config
/// 4. Environment variables
/// 5. Built-in local-cluster defaults
pub fn resolve_connection(args: &ConnectionArgs, config: &Config) -> Result<ClusterConfig> {
    let mut connection = match args.connection_name() {
        Some(name) => config.get_connection(Some(name)).cloned().ok_or_else(|| {
            KitError::config(format!("Connection '{name}' not found in config file"))
        })?,
        None => config.get_connection(None).cloned().unwrap_or_default(),
    };

    if let Some(cli) = args.to_cluster_config() {
        connection.merge(&cli);
    }

    connection.apply_env_defaults();
    connection.apply_builtin_defaults();

    Ok(connection)
}

/// Pretty-prints a JSON value with two-space indentation.
pub(crate) fn write_json<T: serde::Serialize>(
    value: &T,
    out: &mut impl std::io::Write,
) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| KitError::internal(format!("Failed to render JSON: {e}")))?;
    writeln!(out, "{text}")?;
    Ok(())
}
