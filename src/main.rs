//! scylla-kit - command-line toolkit for ScyllaDB clusters.

use scylla_kit::cli::{Cli, Command};
use scylla_kit::commands;
use scylla_kit::config::Config;
use scylla_kit::error::Result;
use scylla_kit::logging;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    // A missing .env file is not an error
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    logging::init_stderr_logging(cli.log.as_deref());

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;
    debug!("{} named connection(s) configured", config.connections.len());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Command::Version(args) => commands::version::run(args, &config, &mut out).await,
        Command::Cloud { action } => commands::cloud::run(action, &config, &mut out).await,
        Command::LoadJson(args) => commands::load::run(args, &config, &mut out).await,
    }
}
