use std::io::{self, Stdout};
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use super::app::App;

/// Spin up the terminal backend, enter the draw loop, and keep processing input
/// until the user quits. Input polling never outlasts a pending search
/// deadline, so debounced searches fire on time.
pub fn run_app(app: &mut App) -> Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    info!("terminal session started");

    let result = event_loop(app, &mut terminal);

    cleanup_terminal(&mut terminal)?;
    info!("terminal session ended");
    result
}

fn event_loop(app: &mut App, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    loop {
        terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw frame")?;

        let timeout = app.poll_timeout(Instant::now());
        let key = if event::poll(timeout).context("event polling failed")? {
            match event::read().context("failed to read event")? {
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => Some(key_event),
                _ => None,
            }
        } else {
            None
        };

        if step(app, key, Instant::now())? {
            return Ok(());
        }
    }
}

/// Dispatch one key press (if any), then let a due search fire. Returns
/// whether the user asked to quit.
fn step(app: &mut App, key: Option<KeyEvent>, now: Instant) -> Result<bool> {
    if let Some(key_event) = key {
        let handled = if key_event.modifiers.contains(KeyModifiers::CONTROL) {
            match key_event.code {
                KeyCode::Char('c') => return Ok(true),
                KeyCode::Char('e') => {
                    app.handle_ctrl_e();
                    true
                }
                KeyCode::Char('d') => {
                    app.handle_ctrl_d();
                    true
                }
                _ => false,
            }
        } else {
            false
        };

        if !handled && app.handle_key(key_event.code)? {
            return Ok(true);
        }
    }

    app.tick(now);
    Ok(false)
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal
        .show_cursor()
        .context("failed to restore cursor visibility")
}
