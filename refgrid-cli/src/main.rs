mod commands;
mod error;
mod logging;
mod paths;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use crate::commands::Command;

#[derive(Parser)]
#[command(name = "refgrid")]
#[command(about = "Browse and edit reference data tables")]
struct Cli {
    /// Base URL of the CRUD API.
    #[arg(long, global = true, env = "REFGRID_API_URL", default_value = "https://apiv2.medleb.org")]
    api_url: String,

    /// Timeout for create, update and delete calls.
    #[arg(long, global = true, default_value_t = 10)]
    timeout_secs: u64,

    /// Work on bundled sample data without contacting the API.
    #[arg(long, global = true, default_value_t = false)]
    offline: bool,

    /// Table settings database.
    #[arg(long, global = true)]
    settings_db: Option<PathBuf>,

    /// Echo log output to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    let context = commands::Context {
        api_url: cli.api_url,
        timeout: std::time::Duration::from_secs(cli.timeout_secs),
        offline: cli.offline,
        settings_db: cli.settings_db.or_else(paths::settings_db),
    };

    match commands::run(&context, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
