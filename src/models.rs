//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. These types stay light-weight data holders so the other layers can
//! focus on presentation and persistence logic.

use std::fmt;

/// Maximum characters stored in `songs.songtitle`.
pub const TITLE_MAX_LEN: usize = 40;
/// Maximum characters stored in `songs.artist`.
pub const ARTIST_MAX_LEN: usize = 30;
/// Maximum characters stored in `songs.genre`.
pub const GENRE_MAX_LEN: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A catalog row. `id` is assigned by the store on insert and never changes.
pub struct Song {
    /// Primary key from the SQLite store. Edit and delete flows bubble it back
    /// to the persistence layer.
    pub id: i64,
    /// Title displayed in lists and search results (`songtitle` column).
    pub title: String,
    pub artist: String,
    /// Release year. The column is nullable even though the forms always
    /// collect one.
    pub year: Option<i32>,
    pub genre: String,
}

impl Song {
    /// Attach a freshly assigned id to an insert payload.
    pub fn from_new(id: i64, song: NewSong) -> Self {
        Self {
            id,
            title: song.title,
            artist: song.artist,
            year: song.year,
            genre: song.genre,
        }
    }

    /// Year rendered for display, blank when unknown.
    pub fn year_label(&self) -> String {
        self.year.map(|year| year.to_string()).unwrap_or_default()
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.title, self.artist)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Insert payload: a song that has not been assigned an id yet.
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub year: Option<i32>,
    pub genre: String,
}

impl NewSong {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        year: Option<i32>,
        genre: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            year,
            genre: genre.into(),
        }
    }
}

/// One page of the catalog together with the page count observed alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SongPage {
    pub songs: Vec<Song>,
    pub total_pages: u32,
}
