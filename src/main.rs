mod config;
mod db;
mod error;
mod models;
mod recurrence;
mod run;
mod store;
mod summary;
mod ui;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::store::SubscriptionStore;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = Config::from_env()?;
    init_logging(&config)?;

    let db = db::Database::open(&config.db_path)?;
    let mut store = SubscriptionStore::load(db)?;

    match args.len() {
        1 => run::as_tui(&mut store, &config),
        _ => run::as_cli(&args, &mut store, &config),
    }
}

/// Log to a file in the data directory so the TUI screen stays clean.
/// `RUST_LOG` controls the filter, defaulting to `info`.
fn init_logging(config: &Config) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| format!("Failed to open log file: {}", config.log_path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    log::debug!("data directory: {}", config.data_dir.display());
    Ok(())
}
