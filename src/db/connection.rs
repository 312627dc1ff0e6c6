use std::path::Path;

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use tracing::debug;

use super::error::Result;

/// Handle over the embedded SQLite catalog. Built once at startup and handed
/// to the TUI; tests open their own in-memory copies.
pub struct CatalogStore {
    pub(super) conn: Connection,
}

impl CatalogStore {
    /// Open (or create) the database file and make sure the `songs` table
    /// exists. The parent directory must already exist.
    pub fn open(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "opening catalog database");
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory catalog.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        register_functions(&conn)?;
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// `casefold(x)` lowers text with Unicode rules; SQLite's own `lower` and
/// `LIKE` only fold ASCII letters.
fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "casefold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text = ctx.get::<Option<String>>(0)?;
            Ok(text.map(|value| value.to_lowercase()))
        },
    )?;
    Ok(())
}

/// Run the lazy migration. `AUTOINCREMENT` keeps SQLite from handing out the
/// id of a deleted row again.
fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            songtitle VARCHAR(40) NOT NULL,
            artist VARCHAR(30) NOT NULL,
            year INTEGER,
            genre VARCHAR(30) NOT NULL
        )",
        [],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewSong;

    #[test]
    fn file_backed_catalog_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.sqlite");

        let id = {
            let store = CatalogStore::open(&path).unwrap();
            store
                .create_song(&NewSong::new("Yesterday", "The Beatles", Some(1965), "Rock"))
                .unwrap()
        };

        let store = CatalogStore::open(&path).unwrap();
        let songs = store.fetch_page(1).unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].id, id);
        assert_eq!(songs[0].title, "Yesterday");
    }

    #[test]
    fn opening_twice_keeps_existing_rows() {
        let store = CatalogStore::open_in_memory().unwrap();
        store
            .create_song(&NewSong::new("Blue", "Joni Mitchell", Some(1971), "Folk"))
            .unwrap();
        ensure_schema(store.connection()).unwrap();
        assert_eq!(store.count_pages().unwrap(), 1);
    }

    #[test]
    fn casefold_lowers_non_ascii_letters() {
        let store = CatalogStore::open_in_memory().unwrap();
        let folded: String = store
            .connection()
            .query_row("SELECT casefold('BJÖRK Électronique')", [], |row| row.get(0))
            .unwrap();
        assert_eq!(folded, "björk électronique");

        let null: Option<String> = store
            .connection()
            .query_row("SELECT casefold(NULL)", [], |row| row.get(0))
            .unwrap();
        assert_eq!(null, None);
    }
}
