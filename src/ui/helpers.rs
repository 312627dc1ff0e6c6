use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use regex::{Regex, RegexBuilder};

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Case-insensitive literal matcher for `term`, or `None` when there is
/// nothing worth highlighting.
pub(crate) fn search_pattern(term: &str) -> Option<Regex> {
    if term.trim().is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Split `text` into `(segment, matched)` pieces on every match of `pattern`.
/// Concatenating the segments gives back the original text.
pub(crate) fn highlight_segments<'a>(text: &'a str, pattern: Option<&Regex>) -> Vec<(&'a str, bool)> {
    let Some(pattern) = pattern else {
        return vec![(text, false)];
    };

    let mut segments = Vec::new();
    let mut cursor = 0;
    for found in pattern.find_iter(text) {
        if found.start() > cursor {
            segments.push((&text[cursor..found.start()], false));
        }
        segments.push((found.as_str(), true));
        cursor = found.end();
    }
    if cursor < text.len() || segments.is_empty() {
        segments.push((&text[cursor..], false));
    }
    segments
}

/// Render `text` with every match of `pattern` in bold.
pub(crate) fn highlighted_line(text: &str, pattern: Option<&Regex>) -> Line<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let spans: Vec<Span<'static>> = highlight_segments(text, pattern)
        .into_iter()
        .map(|(segment, matched)| {
            if matched {
                Span::styled(segment.to_string(), bold)
            } else {
                Span::raw(segment.to_string())
            }
        })
        .collect();
    Line::from(spans)
}
