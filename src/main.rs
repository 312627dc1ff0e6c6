//! Binary entry point that glues the SQLite-backed catalog to the TUI: resolve
//! configuration, start logging, open the store, load the first page, and
//! drive the Ratatui event loop until the user exits.
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use song_catalog::config::ensure_parent_dir;
use song_catalog::{logging, run_app, App, AppConfig, CatalogStore};

#[derive(Parser)]
#[command(name = "song-catalog")]
#[command(version)]
#[command(about = "Browse, search, and edit a catalog of music records")]
struct Cli {
    /// Path to the SQLite database (defaults to ~/.song-catalog/catalog.sqlite)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Path to the log file (defaults to ~/.song-catalog/song-catalog.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::resolve(cli.database, cli.log_file, cli.verbose)?;
    logging::init(&config)?;

    ensure_parent_dir(&config.database_path)?;
    let store = CatalogStore::open(&config.database_path).with_context(|| {
        format!(
            "failed to open catalog at {}",
            config.database_path.display()
        )
    })?;
    tracing::info!(database = %config.database_path.display(), "catalog opened");

    let mut app = App::new(store);
    app.refresh_library();
    run_app(&mut app)
}
