use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::time::SystemTime;

use super::app::AppState;
use crate::presentation::formatters::{ago_text, display_dir, file_name, fit_dir};
use fmtwatch_types::{EntryState, SnapshotEntry, WatchSet};

const AGE_WIDTH: usize = 9;
const HELP: &str = "j/k move  enter format/touch  f format all  a add all  o format on focus  q quit";

pub(crate) fn draw(f: &mut Frame, state: &AppState, watch_set: &WatchSet) {
    let footer_height = state.notices.len() as u16 + 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(footer_height),
        ])
        .split(f.area());

    render_header(f, chunks[0], state);
    render_entries(f, chunks[1], state, watch_set);
    render_footer(f, chunks[2], state);
}

fn render_header(f: &mut Frame, area: Rect, state: &AppState) {
    let auto = if state.auto_format { "on" } else { "off" };
    let line = Line::from(vec![
        Span::styled("fmtwatch", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(
            format!("{} pending", state.pending_count()),
            Style::default().fg(Color::Red),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} formatted", state.formatted_count()),
            Style::default().fg(Color::Green),
        ),
        Span::raw(format!("  format on focus: {}", auto)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn render_entries(f: &mut Frame, area: Rect, state: &AppState, watch_set: &WatchSet) {
    let now = SystemTime::now();
    let width = area.width as usize;

    let items: Vec<ListItem> = state
        .snapshot
        .entries
        .iter()
        .map(|entry| ListItem::new(entry_line(entry, watch_set, now, width)))
        .collect();

    let list = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    if !state.snapshot.entries.is_empty() {
        list_state.select(Some(state.selected));
    }
    f.render_stateful_widget(list, area, &mut list_state);
}

fn entry_line(
    entry: &SnapshotEntry,
    watch_set: &WatchSet,
    now: SystemTime,
    width: usize,
) -> Line<'static> {
    let relative = watch_set.relative(&entry.path);
    let name = file_name(relative);
    let age = ago_text(now, entry.timestamp);

    // highlight symbol + spaces around the age column
    let reserved = 2 + name.chars().count() + AGE_WIDTH + 2;
    let dir = fit_dir(&display_dir(relative), width.saturating_sub(reserved));

    let color = match entry.state {
        EntryState::Pending => Color::Red,
        EntryState::Formatted => Color::Green,
    };

    Line::from(vec![
        Span::styled(
            format!("{:>width$}", age, width = AGE_WIDTH),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(dir, Style::default().fg(Color::Gray)),
        Span::styled(name, Style::default().fg(color)),
    ])
}

fn render_footer(f: &mut Frame, area: Rect, state: &AppState) {
    let mut lines: Vec<Line> = state
        .notices
        .iter()
        .map(|notice| {
            let style = if notice.is_error() {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            Line::styled(notice.to_string(), style)
        })
        .collect();
    lines.push(Line::styled(HELP, Style::default().fg(Color::DarkGray)));

    let footer = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(footer, area);
}
