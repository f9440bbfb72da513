//! Season relay host - native messaging host that relays one-time codes from
//! the push endpoint to browser tabs.

mod app;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use relay_config_and_utils::{init_logging, Config, Paths};

/// Season relay host command-line interface.
#[derive(Parser)]
#[command(name = "season-relay-host")]
#[command(about = "Native messaging host relaying one-time codes to browser tabs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error). Defaults to the configured level
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Base directory for config, credentials and logs. Defaults to ~/.season-relay
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the browser over stdin/stdout (default)
    Run,
    /// Show whether a session is stored
    Status,
    /// Remove the stored session
    Logout,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    paths.ensure_dirs()?;
    let config = Config::load(&paths)?;

    // stdout carries native messaging frames; logs go to stderr and the log file.
    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging(log_level, Some(&paths.log_file()));

    match cli.command {
        Some(Commands::Run) | None => {
            app::run_host(config, paths).await?;
        }
        Some(Commands::Status) => {
            app::check_status(&paths).await?;
        }
        Some(Commands::Logout) => {
            app::logout(&paths).await?;
        }
    }

    Ok(())
}
