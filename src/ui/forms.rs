use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{NewSong, Song, ARTIST_MAX_LEN, GENRE_MAX_LEN, TITLE_MAX_LEN};

/// Digits accepted in the year field.
const YEAR_MAX_LEN: usize = 4;

/// Form state shared by the add screen and the inline edit dialog.
#[derive(Default, Clone)]
pub(crate) struct SongForm {
    pub(crate) title: String,
    pub(crate) artist: String,
    pub(crate) year: String,
    pub(crate) genre: String,
    pub(crate) active: SongField,
    pub(crate) error: Option<String>,
}

/// Enumerates the fields within the song form to drive focus management.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum SongField {
    #[default]
    Title,
    Artist,
    Year,
    Genre,
}

impl SongField {
    /// Every field in display order.
    pub(crate) const ALL: [SongField; 4] = [
        SongField::Title,
        SongField::Artist,
        SongField::Year,
        SongField::Genre,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            SongField::Title => "Title",
            SongField::Artist => "Artist",
            SongField::Year => "Year",
            SongField::Genre => "Genre",
        }
    }

    fn max_len(self) -> usize {
        match self {
            SongField::Title => TITLE_MAX_LEN,
            SongField::Artist => ARTIST_MAX_LEN,
            SongField::Year => YEAR_MAX_LEN,
            SongField::Genre => GENRE_MAX_LEN,
        }
    }

    /// Row of the field inside the rendered form.
    pub(crate) fn row(self) -> u16 {
        match self {
            SongField::Title => 0,
            SongField::Artist => 1,
            SongField::Year => 2,
            SongField::Genre => 3,
        }
    }
}

impl SongForm {
    /// Populate the form from an existing song when entering edit mode.
    pub(crate) fn from_song(song: &Song) -> Self {
        Self {
            title: song.title.clone(),
            artist: song.artist.clone(),
            year: song.year_label(),
            genre: song.genre.clone(),
            active: SongField::Title,
            error: None,
        }
    }

    fn value(&self, field: SongField) -> &String {
        match field {
            SongField::Title => &self.title,
            SongField::Artist => &self.artist,
            SongField::Year => &self.year,
            SongField::Genre => &self.genre,
        }
    }

    fn value_mut(&mut self, field: SongField) -> &mut String {
        match field {
            SongField::Title => &mut self.title,
            SongField::Artist => &mut self.artist,
            SongField::Year => &mut self.year,
            SongField::Genre => &mut self.genre,
        }
    }

    /// Cycle focus forward across the four fields.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            SongField::Title => SongField::Artist,
            SongField::Artist => SongField::Year,
            SongField::Year => SongField::Genre,
            SongField::Genre => SongField::Title,
        };
    }

    /// Cycle focus backward.
    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            SongField::Title => SongField::Genre,
            SongField::Artist => SongField::Title,
            SongField::Year => SongField::Artist,
            SongField::Genre => SongField::Year,
        };
    }

    /// Append a character to the active field. Control characters, non-digits
    /// in the year, and anything past the column width are refused.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let field = self.active;
        if field == SongField::Year && !ch.is_ascii_digit() {
            return false;
        }
        if self.value_len(field) >= field.max_len() {
            return false;
        }
        self.value_mut(field).push(ch);
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    /// Validate the inputs and return a payload ready for persistence. Every
    /// field is required, including a non-zero year.
    pub(crate) fn parse_inputs(&self) -> Result<NewSong> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Song title is required."));
        }
        let artist = self.artist.trim();
        if artist.is_empty() {
            return Err(anyhow!("Artist is required."));
        }
        let year_raw = self.year.trim();
        if year_raw.is_empty() {
            return Err(anyhow!("Year is required."));
        }
        let year = year_raw
            .parse::<i32>()
            .map_err(|_| anyhow!("Year must be a number."))?;
        if year == 0 {
            return Err(anyhow!("Year is required."));
        }
        let genre = self.genre.trim();
        if genre.is_empty() {
            return Err(anyhow!("Genre is required."));
        }

        Ok(NewSong::new(title, artist, Some(year), genre))
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: SongField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Character length of the requested field.
    pub(crate) fn value_len(&self, field: SongField) -> usize {
        self.value(field).chars().count()
    }
}

/// State for confirming permanent song deletion.
pub(crate) struct ConfirmSongDelete {
    pub(crate) song: Song,
}
