//! `version`: print the cluster's release version.

use super::resolve_connection;
use crate::cli::ConnectionArgs;
use crate::config::Config;
use crate::db::{self, CqlClient};
use crate::error::Result;
use std::io::Write;
use tracing::info;

/// Connects, queries `system.local` and prints the release version.
///
/// The session is closed on every path out of this function.
pub async fn run(args: &ConnectionArgs, config: &Config, out: &mut impl Write) -> Result<()> {
    let cluster = resolve_connection(args, config)?;
    info!("Connecting to {}", cluster.display_string());

    let client = db::connect(&cluster).await?;
    let result = print_version(client.as_ref(), out).await;
    client.close().await?;
    result
}

/// Queries the release version and writes it as a single line.
pub async fn print_version(client: &dyn CqlClient, out: &mut impl Write) -> Result<()> {
    let version = db::release_version(client).await?;
    writeln!(out, "{version}")?;
    Ok(())
}
