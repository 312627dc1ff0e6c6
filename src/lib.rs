//! Core library surface for the Song Catalog TUI application.
//!
//! The public modules expose the SQLite-backed catalog store so the `bin`
//! target, tests, and potential external tooling can reuse the same pieces.
pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod ui;

/// The catalog store handle and its error taxonomy.
pub use db::{CatalogError, CatalogStore, PAGE_SIZE};

/// Domain types passed between the store and the views.
pub use models::{NewSong, Song, SongPage};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};

pub use config::AppConfig;
