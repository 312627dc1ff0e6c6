use std::mem;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::Frame;
use tracing::warn;

use crate::db::CatalogStore;
use crate::models::Song;

use super::forms::{ConfirmSongDelete, SongField, SongForm};
use super::helpers::{centered_rect, highlighted_line, surface_error};
use super::screens::{AddView, ListView, SearchView};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Longest the event loop sleeps while no search is pending.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Column layout shared by the library and search tables.
const SONG_COLUMNS: [Constraint; 4] = [
    Constraint::Percentage(38),
    Constraint::Percentage(28),
    Constraint::Length(6),
    Constraint::Percentage(28),
];

/// Top-level views. The library is home; search and add hold their own state
/// and are discarded when the user leaves them.
enum Screen {
    Library,
    Search(SearchView),
    Add(AddView),
}

/// Modal overlays scoped to the current screen.
enum Mode {
    Normal,
    EditingSong { song_id: i64, form: SongForm },
    ConfirmSongDelete(ConfirmSongDelete),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI.
pub struct App {
    store: CatalogStore,
    library: ListView,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: CatalogStore) -> Self {
        Self {
            store,
            library: ListView::new(),
            screen: Screen::Library,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Reload the page the library is showing. Failures become a footer
    /// notice and leave the previous rows in place.
    pub fn refresh_library(&mut self) {
        if let Err(err) = self.library.reload(&self.store) {
            self.report_error("failed to load songs", err.into());
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::EditingSong { song_id, form } => self.handle_edit_song(code, song_id, form)?,
            Mode::ConfirmSongDelete(confirm) => self.handle_confirm_song_delete(code, confirm)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    /// Fire the debounced search once it is due.
    pub fn tick(&mut self, now: Instant) {
        if let Screen::Search(view) = &mut self.screen {
            if let Err(err) = view.tick(&self.store, now) {
                self.report_error("search failed", err);
            }
        }
    }

    /// How long the event loop may block on input before `tick` is needed.
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        match &self.screen {
            Screen::Search(view) => view
                .deadline()
                .map(|due| due.saturating_duration_since(now).min(IDLE_POLL))
                .unwrap_or(IDLE_POLL),
            _ => IDLE_POLL,
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Library => {
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        *exit = true;
                    }
                    KeyCode::Left | KeyCode::PageUp | KeyCode::Char('h') => {
                        self.clear_status();
                        if let Err(err) = self.library.previous_page(&self.store) {
                            self.report_error("failed to load page", err.into());
                        }
                    }
                    KeyCode::Right | KeyCode::PageDown | KeyCode::Char('l') => {
                        self.clear_status();
                        if let Err(err) = self.library.next_page(&self.store) {
                            self.report_error("failed to load page", err.into());
                        }
                    }
                    KeyCode::Char('/') | KeyCode::Char('s') | KeyCode::Char('S') => {
                        self.clear_status();
                        self.screen = Screen::Search(SearchView::new());
                    }
                    KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Char('+') => {
                        self.clear_status();
                        self.screen = Screen::Add(AddView::new());
                    }
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        self.clear_status();
                        self.refresh_library();
                    }
                    _ => {}
                }
                Ok(Mode::Normal)
            }
            Screen::Search(_) => self.handle_search_key(code),
            Screen::Add(_) => {
                self.handle_add_key(code);
                Ok(Mode::Normal)
            }
        }
    }

    fn handle_search_key(&mut self, code: KeyCode) -> Result<Mode> {
        let now = Instant::now();
        let Screen::Search(view) = &mut self.screen else {
            return Ok(Mode::Normal);
        };

        match code {
            KeyCode::Esc => {}
            KeyCode::Up => view.move_selection(-1),
            KeyCode::Down => view.move_selection(1),
            KeyCode::PageUp => view.move_selection(-5),
            KeyCode::PageDown => view.move_selection(5),
            KeyCode::Backspace => view.backspace(now),
            KeyCode::Enter => return Ok(self.edit_selected()),
            KeyCode::Delete => return Ok(self.confirm_delete_selected()),
            KeyCode::Char(ch) if !ch.is_control() => view.push_char(ch, now),
            _ => {}
        }

        if code == KeyCode::Esc {
            self.go_home();
        }
        Ok(Mode::Normal)
    }

    fn handle_add_key(&mut self, code: KeyCode) {
        let mut status_to_set: Option<(String, StatusKind)> = None;
        let mut return_home = false;

        {
            let Screen::Add(view) = &mut self.screen else {
                return;
            };
            match code {
                KeyCode::Esc => return_home = true,
                KeyCode::Tab | KeyCode::Down => view.form.toggle_field(),
                KeyCode::BackTab | KeyCode::Up => view.form.previous_field(),
                KeyCode::Backspace => view.form.backspace(),
                KeyCode::Enter => match view.submit(&self.store) {
                    Ok(id) => {
                        status_to_set = Some((format!("Song added (#{id})."), StatusKind::Info));
                    }
                    Err(err) => {
                        let message = surface_error(&err);
                        warn!(error = %message, "add song rejected");
                        view.form.error = Some(message.clone());
                        status_to_set = Some((message, StatusKind::Error));
                    }
                },
                KeyCode::Char(ch) => {
                    if view.form.push_char(ch) {
                        view.form.error = None;
                    }
                }
                _ => {}
            }
        }

        if return_home {
            self.go_home();
        } else if let Some((text, kind)) = status_to_set {
            self.set_status(text, kind);
        }
    }

    fn handle_edit_song(&mut self, code: KeyCode, song_id: i64, mut form: SongForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.toggle_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.parse_inputs() {
                Ok(new_song) => {
                    let song = Song::from_new(song_id, new_song);
                    match self.store.update_song(&song) {
                        Ok(()) => {
                            self.clear_search();
                            self.set_status("Song updated.", StatusKind::Info);
                            keep_open = false;
                        }
                        Err(err) => {
                            let message = err.to_string();
                            warn!(song_id, error = %message, "song update failed");
                            form.error = Some(message.clone());
                            self.set_status(message, StatusKind::Error);
                        }
                    }
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::EditingSong { song_id, form })
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_song_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmSongDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.store.delete_song(confirm.song.id) {
                    Ok(()) => {
                        self.clear_search();
                        self.set_status("Song deleted.", StatusKind::Info);
                        Ok(Mode::Normal)
                    }
                    Err(err) => {
                        let message = err.to_string();
                        warn!(song_id = confirm.song.id, error = %message, "song delete failed");
                        self.set_status(message, StatusKind::Error);
                        Ok(Mode::ConfirmSongDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmSongDelete(confirm)),
        }
    }

    /// Ctrl+E: edit the highlighted search result.
    pub(crate) fn handle_ctrl_e(&mut self) {
        if matches!(self.mode, Mode::Normal) && matches!(self.screen, Screen::Search(_)) {
            self.mode = self.edit_selected();
        }
    }

    /// Ctrl+D: ask before deleting the highlighted search result.
    pub(crate) fn handle_ctrl_d(&mut self) {
        if matches!(self.mode, Mode::Normal) && matches!(self.screen, Screen::Search(_)) {
            self.mode = self.confirm_delete_selected();
        }
    }

    fn selected_search_song(&self) -> Option<Song> {
        match &self.screen {
            Screen::Search(view) => view.current_song().cloned(),
            _ => None,
        }
    }

    fn edit_selected(&mut self) -> Mode {
        if let Some(song) = self.selected_search_song() {
            self.clear_status();
            Mode::EditingSong {
                song_id: song.id,
                form: SongForm::from_song(&song),
            }
        } else {
            self.set_status("No song selected to edit.", StatusKind::Error);
            Mode::Normal
        }
    }

    fn confirm_delete_selected(&mut self) -> Mode {
        if let Some(song) = self.selected_search_song() {
            self.clear_status();
            Mode::ConfirmSongDelete(ConfirmSongDelete { song })
        } else {
            self.set_status("No song selected to delete.", StatusKind::Error);
            Mode::Normal
        }
    }

    /// After an edit or delete the search starts over from a blank term.
    fn clear_search(&mut self) {
        if let Screen::Search(view) = &mut self.screen {
            view.clear();
        }
    }

    fn go_home(&mut self) {
        self.screen = Screen::Library;
        self.refresh_library();
    }

    fn report_error(&mut self, action: &str, err: anyhow::Error) {
        let message = surface_error(&err);
        warn!(error = %message, "{action}");
        self.set_status(message, StatusKind::Error);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Library => self.draw_library(frame, content_area),
            Screen::Search(view) => self.draw_search(frame, content_area, view),
            Screen::Add(view) => {
                let editing = matches!(self.mode, Mode::Normal);
                draw_song_form(frame, content_area, "Add Song", &view.form, editing);
            }
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::EditingSong { form, .. } => {
                let popup_area = centered_rect(70, 50, area);
                frame.render_widget(Clear, popup_area);
                draw_song_form(frame, popup_area, "Edit Song", form, true);
            }
            Mode::ConfirmSongDelete(confirm) => self.draw_confirm_song_delete(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_library(&self, frame: &mut Frame, area: Rect) {
        let library = &self.library;
        let title = if library.total_pages == 0 {
            "Music Library".to_string()
        } else {
            format!(
                "Music Library • Page {} of {}",
                library.current_page, library.total_pages
            )
        };
        let block = Block::default().title(title).borders(Borders::ALL);

        if library.songs.is_empty() {
            let text = if library.loading {
                "Loading..."
            } else {
                "No songs yet. Press 'a' to add one."
            };
            let message = Paragraph::new(text).alignment(Alignment::Center).block(block);
            frame.render_widget(message, area);
            return;
        }

        let rows = library.songs.iter().map(|song| {
            Row::new(vec![
                Cell::from(song.title.clone()),
                Cell::from(song.artist.clone()),
                Cell::from(song.year_label()),
                Cell::from(song.genre.clone()),
            ])
        });
        let table = Table::new(rows, SONG_COLUMNS)
            .header(table_header())
            .block(block);
        frame.render_widget(table, area);
    }

    fn draw_search(&self, frame: &mut Frame, area: Rect, view: &SearchView) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let bar = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", view.term)))
            .block(bar.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, chunks[0]);
        if matches!(self.mode, Mode::Normal) {
            let inner = bar.inner(chunks[0]);
            let cursor_x = inner.x + "Search: ".len() as u16 + view.term.chars().count() as u16;
            frame.set_cursor_position((cursor_x, inner.y));
        }

        let results_block = Block::default().borders(Borders::ALL).title("Results");
        if let Some(notice) = view.notice() {
            let message = Paragraph::new(notice.message())
                .alignment(Alignment::Center)
                .block(results_block);
            frame.render_widget(message, chunks[1]);
            return;
        }

        let pattern = view.pattern.as_ref();
        let rows = view.songs.iter().map(|song| {
            Row::new(vec![
                Cell::from(highlighted_line(&song.title, pattern)),
                Cell::from(highlighted_line(&song.artist, pattern)),
                Cell::from(song.year_label()),
                Cell::from(highlighted_line(&song.genre, pattern)),
            ])
        });
        let table = Table::new(rows, SONG_COLUMNS)
            .header(table_header())
            .block(results_block)
            .row_highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut state = TableState::default();
        state.select(Some(view.selected));
        frame.render_stateful_widget(table, chunks[1], &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::EditingSong { .. }) => &[
                ("[Enter]", " Save   "),
                ("[Tab]", " Next field   "),
                ("[Esc]", " Cancel"),
            ],
            (_, Mode::ConfirmSongDelete(_)) => &[("[Y]", " Delete   "), ("[N/Esc]", " Keep")],
            (Screen::Library, Mode::Normal) => &[
                ("[←→]", " Page   "),
                ("[/]", " Search   "),
                ("[a]", " Add   "),
                ("[r]", " Reload   "),
                ("[q]", " Quit"),
            ],
            (Screen::Search(_), Mode::Normal) => &[
                ("[↑↓]", " Select   "),
                ("[Enter/Ctrl+E]", " Edit   "),
                ("[Del/Ctrl+D]", " Delete   "),
                ("[Esc]", " Back"),
            ],
            (Screen::Add(_), Mode::Normal) => &[
                ("[Enter]", " Save   "),
                ("[Tab]", " Next field   "),
                ("[Esc]", " Back"),
            ],
        };

        let spans: Vec<Span<'static>> = hints
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(label.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }

    fn draw_confirm_song_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmSongDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Delete Song").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete '{}' permanently?", confirm.song)),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}

fn table_header() -> Row<'static> {
    Row::new(vec!["Title", "Artist", "Year", "Genre"])
        .style(Style::default().add_modifier(Modifier::BOLD))
}

fn draw_song_form(frame: &mut Frame, area: Rect, title: &str, form: &SongForm, show_cursor: bool) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    frame.render_widget(block.clone(), area);
    let inner = block.inner(area);

    let mut lines: Vec<Line> = SongField::ALL
        .iter()
        .map(|field| form.build_line(*field))
        .collect();
    lines.push(Line::from(""));

    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Enter to save • Tab to switch • Esc to cancel",
            Style::default().fg(Color::Gray),
        )));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);

    if show_cursor {
        let field = form.active;
        let prefix = format!("{}: ", field.label()).len() as u16;
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(field) as u16,
            inner.y + field.row(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::models::NewSong;

    fn app_with(songs: &[NewSong]) -> App {
        let store = CatalogStore::open_in_memory().unwrap();
        for song in songs {
            store.create_song(song).unwrap();
        }
        let mut app = App::new(store);
        app.refresh_library();
        app
    }

    fn press_str(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn settle_search(app: &mut App) {
        app.tick(Instant::now() + Duration::from_secs(1));
    }

    fn status_text(app: &App) -> &str {
        app.status.as_ref().map(|s| s.text.as_str()).unwrap_or("")
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn beatles() -> NewSong {
        NewSong::new("Yesterday", "The Beatles", Some(1965), "Rock")
    }

    #[test]
    fn quit_from_library() {
        let mut app = app_with(&[]);
        assert!(!app.handle_key(KeyCode::Char('x')).unwrap());
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }

    #[test]
    fn add_screen_inserts_and_library_shows_it() {
        let mut app = app_with(&[]);
        app.handle_key(KeyCode::Char('a')).unwrap();

        press_str(&mut app, "Yesterday");
        app.handle_key(KeyCode::Tab).unwrap();
        press_str(&mut app, "The Beatles");
        app.handle_key(KeyCode::Tab).unwrap();
        press_str(&mut app, "1965");
        app.handle_key(KeyCode::Tab).unwrap();
        press_str(&mut app, "Rock");
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(status_text(&app).starts_with("Song added"));

        app.handle_key(KeyCode::Esc).unwrap();
        assert!(matches!(app.screen, Screen::Library));
        assert_eq!(app.library.songs.len(), 1);
        assert_eq!(app.library.songs[0].artist, "The Beatles");
    }

    #[test]
    fn add_screen_rejects_incomplete_form() {
        let mut app = app_with(&[]);
        app.handle_key(KeyCode::Char('a')).unwrap();
        press_str(&mut app, "Only a title");
        app.handle_key(KeyCode::Enter).unwrap();

        assert_eq!(status_text(&app), "Artist is required.");
        let Screen::Add(view) = &app.screen else {
            panic!("left the add screen");
        };
        assert_eq!(view.form.title, "Only a title");
        assert_eq!(app.store.count_pages().unwrap(), 0);
    }

    #[test]
    fn library_pages_with_arrow_keys() {
        let songs: Vec<NewSong> = (0..7)
            .map(|n| NewSong::new(format!("Song {n}"), "Band", Some(2000), "Pop"))
            .collect();
        let mut app = app_with(&songs);
        assert_eq!(app.library.total_pages, 2);

        app.handle_key(KeyCode::Right).unwrap();
        assert_eq!(app.library.current_page, 2);
        assert_eq!(app.library.songs.len(), 2);

        app.handle_key(KeyCode::Left).unwrap();
        assert_eq!(app.library.current_page, 1);
    }

    #[test]
    fn search_then_edit_updates_song() {
        let mut app = app_with(&[beatles()]);
        app.handle_key(KeyCode::Char('/')).unwrap();
        press_str(&mut app, "beat");
        settle_search(&mut app);

        let Screen::Search(view) = &app.screen else {
            panic!("expected search screen");
        };
        assert_eq!(view.songs.len(), 1);

        app.handle_ctrl_e();
        assert!(matches!(app.mode, Mode::EditingSong { .. }));
        for _ in 0..3 {
            app.handle_key(KeyCode::Tab).unwrap();
        }
        for _ in 0.."Rock".len() {
            app.handle_key(KeyCode::Backspace).unwrap();
        }
        press_str(&mut app, "Pop");
        app.handle_key(KeyCode::Enter).unwrap();

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(status_text(&app), "Song updated.");
        let Screen::Search(view) = &app.screen else {
            panic!("expected search screen");
        };
        assert!(view.term.is_empty());
        assert_eq!(app.store.search_songs("pop").unwrap().len(), 1);
        assert!(app.store.search_songs("rock").unwrap().is_empty());
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut app = app_with(&[beatles()]);
        app.handle_key(KeyCode::Char('/')).unwrap();
        press_str(&mut app, "yester");
        settle_search(&mut app);

        app.handle_ctrl_d();
        app.handle_key(KeyCode::Char('n')).unwrap();
        assert_eq!(app.store.count_pages().unwrap(), 1);

        app.handle_key(KeyCode::Delete).unwrap();
        assert!(matches!(app.mode, Mode::ConfirmSongDelete(_)));
        app.handle_key(KeyCode::Char('y')).unwrap();
        assert_eq!(status_text(&app), "Song deleted.");
        assert_eq!(app.store.count_pages().unwrap(), 0);

        app.handle_key(KeyCode::Esc).unwrap();
        assert!(app.library.songs.is_empty());
    }

    #[test]
    fn edit_without_results_reports_error() {
        let mut app = app_with(&[]);
        app.handle_key(KeyCode::Char('/')).unwrap();
        app.handle_ctrl_e();
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(status_text(&app), "No song selected to edit.");
    }

    #[test]
    fn poll_timeout_tracks_pending_search() {
        let mut app = app_with(&[]);
        assert_eq!(app.poll_timeout(Instant::now()), IDLE_POLL);

        app.handle_key(KeyCode::Char('/')).unwrap();
        app.handle_key(KeyCode::Char('x')).unwrap();
        assert!(app.poll_timeout(Instant::now()) <= Duration::from_millis(200));
    }

    #[test]
    fn store_failure_becomes_footer_notice() {
        let mut app = app_with(&[beatles()]);
        app.store
            .connection()
            .execute("DROP TABLE songs", [])
            .unwrap();

        app.handle_key(KeyCode::Char('r')).unwrap();
        let status = app.status.as_ref().expect("status set");
        assert!(matches!(status.kind, StatusKind::Error));
        assert!(!status.text.is_empty());
        assert_eq!(app.library.songs.len(), 1);
    }

    #[test]
    fn empty_library_has_no_page_counter() {
        let app = app_with(&[]);
        let screen = render(&app);
        assert!(screen.contains("Music Library"));
        assert!(!screen.contains("Page 1 of 1"));
        assert!(screen.contains("No songs yet"));

        let app = app_with(&[beatles()]);
        assert!(render(&app).contains("Page 1 of 1"));
    }

    #[test]
    fn renders_library_and_highlighted_search() {
        let mut app = app_with(&[beatles()]);
        let screen = render(&app);
        assert!(screen.contains("Music Library"));
        assert!(screen.contains("Yesterday"));

        app.handle_key(KeyCode::Char('/')).unwrap();
        assert!(render(&app).contains("Enter a search term"));

        press_str(&mut app, "beat");
        assert!(render(&app).contains("Loading..."));

        settle_search(&mut app);
        let screen = render(&app);
        assert!(screen.contains("The Beatles"));
    }
}
