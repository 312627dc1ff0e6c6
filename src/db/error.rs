use thiserror::Error;

/// Failures surfaced by the catalog store. The variants stay distinct even
/// though the TUI collapses them into a single footer notice.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required field is blank, a field is too long, or the page is zero.
    #[error("{0}")]
    Validation(String),
    /// Update or delete targeted an id that is not in the catalog.
    #[error("Song {0} not found")]
    NotFound(i64),
    /// SQLite could not be reached or the statement failed.
    #[error("catalog store unavailable: {0}")]
    StoreUnavailable(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
