use std::time::Instant;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::db::{CatalogError, CatalogStore};
use crate::models::{Song, SongPage};

use super::debounce::{Debouncer, SEARCH_DEBOUNCE};
use super::forms::SongForm;
use super::helpers::search_pattern;

/// Paginated browse state for the home screen.
pub(crate) struct ListView {
    pub(crate) current_page: u32,
    pub(crate) songs: Vec<Song>,
    pub(crate) total_pages: u32,
    /// True until the first page has been applied and while a request runs.
    pub(crate) loading: bool,
}

impl ListView {
    pub(crate) fn new() -> Self {
        Self {
            current_page: 1,
            songs: Vec::new(),
            total_pages: 0,
            loading: true,
        }
    }

    /// Refetch the page currently on screen.
    pub(crate) fn reload(&mut self, store: &CatalogStore) -> Result<(), CatalogError> {
        self.show_page(store, self.current_page)
    }

    pub(crate) fn next_page(&mut self, store: &CatalogStore) -> Result<(), CatalogError> {
        if self.total_pages > 0 && self.current_page >= self.total_pages {
            return Ok(());
        }
        self.show_page(store, self.current_page + 1)
    }

    pub(crate) fn previous_page(&mut self, store: &CatalogStore) -> Result<(), CatalogError> {
        if self.current_page <= 1 {
            return Ok(());
        }
        self.show_page(store, self.current_page - 1)
    }

    /// Load `page`, clamping to the last page when the catalog shrank beneath
    /// it. On failure the previous state stays on screen.
    pub(crate) fn show_page(&mut self, store: &CatalogStore, page: u32) -> Result<(), CatalogError> {
        self.loading = true;
        let fetched = fetch_clamped(store, page.max(1));
        self.loading = false;

        let (page, SongPage { songs, total_pages }) = fetched?;
        debug!(page, total_pages, rows = songs.len(), "list view updated");
        self.current_page = page;
        self.songs = songs;
        self.total_pages = total_pages;
        Ok(())
    }
}

fn fetch_clamped(store: &CatalogStore, page: u32) -> Result<(u32, SongPage), CatalogError> {
    let fetched = store.paged_songs(page)?;
    if fetched.songs.is_empty() && page > 1 {
        let last = fetched.total_pages.max(1);
        if last != page {
            return Ok((last, store.paged_songs(last)?));
        }
    }
    Ok((page, fetched))
}

/// Which placeholder the search screen shows instead of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchNotice {
    EnterTerm,
    Loading,
    NoResults,
}

impl SearchNotice {
    pub(crate) fn message(self) -> &'static str {
        match self {
            SearchNotice::EnterTerm => "Enter a search term to find songs.",
            SearchNotice::Loading => "Loading...",
            SearchNotice::NoResults => "No results found.",
        }
    }
}

/// Debounced free-text search over the catalog.
pub(crate) struct SearchView {
    pub(crate) term: String,
    pub(crate) songs: Vec<Song>,
    pub(crate) fetching: bool,
    pub(crate) selected: usize,
    /// Highlighter for the term that produced `songs`.
    pub(crate) pattern: Option<Regex>,
    debouncer: Debouncer<String>,
}

impl SearchView {
    pub(crate) fn new() -> Self {
        Self {
            term: String::new(),
            songs: Vec::new(),
            fetching: false,
            selected: 0,
            pattern: None,
            debouncer: Debouncer::new(SEARCH_DEBOUNCE),
        }
    }

    pub(crate) fn push_char(&mut self, ch: char, now: Instant) {
        self.term.push(ch);
        self.term_changed(now);
    }

    pub(crate) fn backspace(&mut self, now: Instant) {
        if self.term.pop().is_some() {
            self.term_changed(now);
        }
    }

    /// Reset to the blank state, dropping any pending search.
    pub(crate) fn clear(&mut self) {
        self.term.clear();
        self.reset_results();
    }

    fn term_changed(&mut self, now: Instant) {
        if self.term.trim().is_empty() {
            self.reset_results();
        } else {
            self.fetching = true;
            self.debouncer.schedule(self.term.clone(), now);
        }
    }

    fn reset_results(&mut self) {
        self.debouncer.cancel();
        self.fetching = false;
        self.songs.clear();
        self.pattern = None;
        self.selected = 0;
    }

    /// When the pending search becomes due.
    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Run the pending search if its quiet period is over. Returns whether a
    /// search ran.
    pub(crate) fn tick(&mut self, store: &CatalogStore, now: Instant) -> Result<bool> {
        let Some(term) = self.debouncer.take_due(now) else {
            return Ok(false);
        };

        self.fetching = false;
        let songs = store
            .search_songs(&term)
            .with_context(|| format!("search for '{term}' failed"))?;
        debug!(term = %term, results = songs.len(), "search results applied");
        self.pattern = search_pattern(&term);
        self.songs = songs;
        self.selected = 0;
        Ok(true)
    }

    /// Placeholder to show, or `None` when results should be listed.
    pub(crate) fn notice(&self) -> Option<SearchNotice> {
        if self.term.trim().is_empty() {
            Some(SearchNotice::EnterTerm)
        } else if self.fetching {
            Some(SearchNotice::Loading)
        } else if self.songs.is_empty() {
            Some(SearchNotice::NoResults)
        } else {
            None
        }
    }

    pub(crate) fn current_song(&self) -> Option<&Song> {
        self.songs.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.songs.is_empty() {
            return;
        }
        let len = self.songs.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }
}

/// The add screen is a single always-open form.
pub(crate) struct AddView {
    pub(crate) form: SongForm,
}

impl AddView {
    pub(crate) fn new() -> Self {
        Self {
            form: SongForm::default(),
        }
    }

    /// Validate and insert the form. The form is cleared only on success, so
    /// a failed attempt can be retried as typed.
    pub(crate) fn submit(&mut self, store: &CatalogStore) -> Result<i64> {
        let song = self.form.parse_inputs()?;
        let id = store.create_song(&song).context("failed to add song")?;
        self.form = SongForm::default();
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::NewSong;

    fn store_with(count: usize) -> CatalogStore {
        let store = CatalogStore::open_in_memory().unwrap();
        for n in 0..count {
            store
                .create_song(&NewSong::new(
                    format!("Song {n}"),
                    format!("Band {n}"),
                    Some(2000),
                    "Rock",
                ))
                .unwrap();
        }
        store
    }

    fn type_term(view: &mut SearchView, term: &str, now: Instant) {
        for ch in term.chars() {
            view.push_char(ch, now);
        }
    }

    #[test]
    fn list_view_mounts_first_page() {
        let store = store_with(7);
        let mut view = ListView::new();
        assert!(view.loading);

        view.reload(&store).unwrap();
        assert!(!view.loading);
        assert_eq!(view.current_page, 1);
        assert_eq!(view.songs.len(), 5);
        assert_eq!(view.total_pages, 2);
    }

    #[test]
    fn list_view_stops_at_both_ends() {
        let store = store_with(7);
        let mut view = ListView::new();
        view.reload(&store).unwrap();

        view.previous_page(&store).unwrap();
        assert_eq!(view.current_page, 1);

        view.next_page(&store).unwrap();
        assert_eq!(view.current_page, 2);
        assert_eq!(view.songs.len(), 2);

        view.next_page(&store).unwrap();
        assert_eq!(view.current_page, 2);
        assert_eq!(view.songs.len(), 2);
    }

    #[test]
    fn list_view_clamps_when_last_page_disappears() {
        let store = store_with(6);
        let mut view = ListView::new();
        view.show_page(&store, 2).unwrap();
        assert_eq!(view.songs.len(), 1);

        let last = view.songs[0].id;
        store.delete_song(last).unwrap();
        view.reload(&store).unwrap();

        assert_eq!(view.current_page, 1);
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.songs.len(), 5);
    }

    #[test]
    fn list_view_shows_empty_catalog() {
        let store = store_with(1);
        let mut view = ListView::new();
        view.reload(&store).unwrap();
        store.delete_song(view.songs[0].id).unwrap();

        view.reload(&store).unwrap();
        assert_eq!(view.current_page, 1);
        assert_eq!(view.total_pages, 0);
        assert!(view.songs.is_empty());
    }

    #[test]
    fn list_view_keeps_state_on_failure() {
        let store = store_with(3);
        let mut view = ListView::new();
        view.reload(&store).unwrap();

        store.connection().execute("DROP TABLE songs", []).unwrap();
        assert!(view.reload(&store).is_err());
        assert!(!view.loading);
        assert_eq!(view.songs.len(), 3);
    }

    #[test]
    fn search_waits_for_quiet_period() {
        let store = store_with(3);
        let start = Instant::now();
        let mut view = SearchView::new();
        assert_eq!(view.notice(), Some(SearchNotice::EnterTerm));

        type_term(&mut view, "band 1", start);
        assert_eq!(view.notice(), Some(SearchNotice::Loading));
        assert!(!view.tick(&store, start + Duration::from_millis(100)).unwrap());

        assert!(view.tick(&store, start + SEARCH_DEBOUNCE).unwrap());
        assert_eq!(view.notice(), None);
        assert_eq!(view.songs.len(), 1);
        assert_eq!(view.current_song().unwrap().artist, "Band 1");
        assert!(view.pattern.is_some());
    }

    #[test]
    fn newer_keystroke_supersedes_pending_search() {
        let store = store_with(3);
        let start = Instant::now();
        let mut view = SearchView::new();

        type_term(&mut view, "song", start);
        view.push_char('9', start + Duration::from_millis(150));

        assert!(!view.tick(&store, start + Duration::from_millis(200)).unwrap());
        assert!(view.tick(&store, start + Duration::from_millis(350)).unwrap());
        assert_eq!(view.notice(), Some(SearchNotice::NoResults));
    }

    #[test]
    fn due_search_applies_latest_term() {
        let store = store_with(12);
        let start = Instant::now();
        let mut view = SearchView::new();

        type_term(&mut view, "band 2", start);
        view.backspace(start + Duration::from_millis(50));
        view.push_char('1', start + Duration::from_millis(100));

        assert!(view.tick(&store, start + Duration::from_millis(300)).unwrap());
        let artists: Vec<&str> = view.songs.iter().map(|s| s.artist.as_str()).collect();
        assert_eq!(artists, vec!["Band 1", "Band 10", "Band 11"]);
        assert!(view.pattern.as_ref().unwrap().is_match("BAND 1"));
        assert!(!view.fetching);
    }

    #[test]
    fn clearing_term_cancels_search() {
        let store = store_with(3);
        let start = Instant::now();
        let mut view = SearchView::new();

        type_term(&mut view, "s", start);
        view.backspace(start);
        assert_eq!(view.deadline(), None);
        assert!(!view.fetching);
        assert!(!view.tick(&store, start + Duration::from_secs(1)).unwrap());
        assert_eq!(view.notice(), Some(SearchNotice::EnterTerm));

        type_term(&mut view, "   ", start);
        assert_eq!(view.deadline(), None);
    }

    #[test]
    fn failed_search_clears_loading_state() {
        let store = store_with(1);
        store.connection().execute("DROP TABLE songs", []).unwrap();
        let start = Instant::now();
        let mut view = SearchView::new();

        type_term(&mut view, "x", start);
        assert!(view.tick(&store, start + SEARCH_DEBOUNCE).is_err());
        assert!(!view.fetching);
    }

    #[test]
    fn selection_stays_in_bounds() {
        let store = store_with(3);
        let start = Instant::now();
        let mut view = SearchView::new();
        type_term(&mut view, "rock", start);
        view.tick(&store, start + SEARCH_DEBOUNCE).unwrap();

        view.move_selection(10);
        assert_eq!(view.selected, 2);
        view.move_selection(-10);
        assert_eq!(view.selected, 0);
    }

    #[test]
    fn add_view_clears_form_after_insert() {
        let store = store_with(0);
        let mut view = AddView::new();
        view.form.title = "Yesterday".to_string();
        view.form.artist = "The Beatles".to_string();
        view.form.year = "1965".to_string();
        view.form.genre = "Rock".to_string();

        let id = view.submit(&store).unwrap();
        assert!(view.form.title.is_empty());
        assert_eq!(store.search_songs("beat").unwrap()[0].id, id);
    }

    #[test]
    fn add_view_keeps_form_on_failure() {
        let store = store_with(0);
        let mut view = AddView::new();
        view.form.title = "Yesterday".to_string();
        view.form.artist = "The Beatles".to_string();
        view.form.genre = "Rock".to_string();

        assert!(view.submit(&store).is_err());
        assert_eq!(view.form.title, "Yesterday");

        view.form.year = "1965".to_string();
        store.connection().execute("DROP TABLE songs", []).unwrap();
        assert!(view.submit(&store).is_err());
        assert_eq!(view.form.artist, "The Beatles");
        assert_eq!(view.form.year, "1965");
    }
}
