use rusqlite::{params, Row};
use tracing::{debug, info};

use crate::models::{NewSong, Song, SongPage, ARTIST_MAX_LEN, GENRE_MAX_LEN, TITLE_MAX_LEN};

use super::connection::CatalogStore;
use super::error::{CatalogError, Result};

/// Rows per catalog page.
pub const PAGE_SIZE: u32 = 5;

/// Number of pages needed to show `total_rows` songs.
pub fn page_count(total_rows: u64) -> u32 {
    total_rows.div_ceil(u64::from(PAGE_SIZE)) as u32
}

/// Row offset of the first song on a 1-based page.
pub fn page_offset(page: u32) -> u64 {
    u64::from(page.saturating_sub(1)) * u64::from(PAGE_SIZE)
}

impl CatalogStore {
    /// Return the songs on a 1-based page, ordered by id so pages never
    /// overlap. Pages past the end come back empty.
    pub fn fetch_page(&self, page: u32) -> Result<Vec<Song>> {
        if page == 0 {
            return Err(CatalogError::Validation(
                "Page numbers start at 1.".to_string(),
            ));
        }
        let offset = page_offset(page) as i64;
        debug!(page, offset, "fetching catalog page");

        let mut stmt = self.conn.prepare(
            "SELECT id, songtitle, artist, year, genre
             FROM songs
             ORDER BY id
             LIMIT ?1 OFFSET ?2",
        )?;
        let songs = stmt
            .query_map(params![PAGE_SIZE, offset], song_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(songs)
    }

    /// Count the pages in the catalog. An empty catalog has zero pages.
    pub fn count_pages(&self) -> Result<u32> {
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM songs", [], |row| row.get(0))?;
        Ok(page_count(total.max(0) as u64))
    }

    /// Fetch a page plus the current page count, the pair the list view
    /// needs for every render.
    pub fn paged_songs(&self, page: u32) -> Result<SongPage> {
        let songs = self.fetch_page(page)?;
        let total_pages = self.count_pages()?;
        Ok(SongPage { songs, total_pages })
    }

    /// Songs whose title, artist or genre contains `term`, ignoring case for
    /// any script. The term is matched literally; `%` and `_` are not
    /// wildcards here.
    pub fn search_songs(&self, term: &str) -> Result<Vec<Song>> {
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        debug!(term, "searching catalog");

        let mut stmt = self.conn.prepare(
            r"SELECT id, songtitle, artist, year, genre
              FROM songs
              WHERE casefold(songtitle) LIKE ?1 ESCAPE '\'
                 OR casefold(artist) LIKE ?1 ESCAPE '\'
                 OR casefold(genre) LIKE ?1 ESCAPE '\'
              ORDER BY id",
        )?;
        let songs = stmt
            .query_map([pattern], song_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(songs)
    }

    /// Insert a brand new song and return the id SQLite assigned to it.
    pub fn create_song(&self, song: &NewSong) -> Result<i64> {
        validate_fields(&song.title, &song.artist, &song.genre)?;

        self.conn.execute(
            "INSERT INTO songs (songtitle, artist, year, genre) VALUES (?1, ?2, ?3, ?4)",
            params![song.title, song.artist, song.year, song.genre],
        )?;

        let id = self.conn.last_insert_rowid();
        info!(id, title = %song.title, "song created");
        Ok(id)
    }

    /// Replace every editable field of an existing song. Touching zero rows
    /// is reported as `NotFound` rather than silently succeeding.
    pub fn update_song(&self, song: &Song) -> Result<()> {
        validate_fields(&song.title, &song.artist, &song.genre)?;

        let updated = self.conn.execute(
            "UPDATE songs SET songtitle = ?1, artist = ?2, year = ?3, genre = ?4 WHERE id = ?5",
            params![song.title, song.artist, song.year, song.genre, song.id],
        )?;

        if updated == 0 {
            Err(CatalogError::NotFound(song.id))
        } else {
            info!(id = song.id, "song updated");
            Ok(())
        }
    }

    /// Permanently delete a song. Deleting an id that is already gone is an
    /// error so callers can tell "deleted" from "nothing happened".
    pub fn delete_song(&self, id: i64) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM songs WHERE id = ?1", params![id])?;

        if deleted == 0 {
            Err(CatalogError::NotFound(id))
        } else {
            info!(id, "song deleted");
            Ok(())
        }
    }
}

fn song_from_row(row: &Row<'_>) -> rusqlite::Result<Song> {
    Ok(Song {
        id: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
        year: row.get(3)?,
        genre: row.get(4)?,
    })
}

/// Backslash-escape the characters `LIKE` treats specially.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// The forms are the primary gate; this repeats the checks so nothing blank
/// or oversized reaches the table.
fn validate_fields(title: &str, artist: &str, genre: &str) -> Result<()> {
    for (label, value, max) in [
        ("Song title", title, TITLE_MAX_LEN),
        ("Artist", artist, ARTIST_MAX_LEN),
        ("Genre", genre, GENRE_MAX_LEN),
    ] {
        if value.trim().is_empty() {
            return Err(CatalogError::Validation(format!("{label} is required.")));
        }
        if value.chars().count() > max {
            return Err(CatalogError::Validation(format!(
                "{label} must be at most {max} characters."
            )));
        }
    }
    Ok(())
}
