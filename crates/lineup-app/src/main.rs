// Lineup command-line entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file, stdout is for command output)
// 3. Load config
// 4. Open database
// 5. Run the requested command

mod cli;
mod clipboard;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use lineup_core::config;
use lineup_core::service::LineupService;
use lineup_core::sink::SharedState;
use lineup_core::store::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Parse arguments
    let args = cli::Cli::parse();

    // 2. Initialize tracing
    init_tracing()?;
    info!("lineup starting: {:?}", args.command);

    // 3. Load config
    let mut config = match &args.config {
        Some(path) => config::load_config_file(path),
        None => config::load_config(),
    }
    .context("failed to load configuration")?;
    match &config.source {
        Some(path) => info!("Config loaded from {}", path.display()),
        None => info!("No config file found, using built-in defaults"),
    }
    if let Some(db) = &args.db {
        config.storage.db_path = Some(db.display().to_string());
    }

    // 4. Open database
    let db_path = config.storage.resolved_db_path();
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let db_path_str = db_path.display().to_string();
    let db = Database::open(&db_path_str).context("failed to open database")?;
    info!("Database opened at {}", db_path_str);

    // 5. Run the command
    let mut svc = LineupService::new(db, SharedState::new(), config);
    if let Some(seed) = args.seed {
        svc = svc.with_seed(seed);
    }

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = cli::execute(args.command, &mut svc, &mut stdout).await {
        error!("Command failed: {:#}", e);
        return Err(e);
    }

    info!("lineup finished");
    Ok(())
}

/// Initialize tracing to log to a file, keeping stdout clean for command output.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("lineup.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lineup=info,lineup_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
