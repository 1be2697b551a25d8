// mapty-tui/src/ui/status_bar.rs
use crate::app::{ActiveModal, App, Focus};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

pub fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status_text = match app.active_modal {
        ActiveModal::None if app.core.form().is_visible() => {
            " [Tab/↑↓] Field | [←→] Running/Cycling | [Enter] Save | [Esc] Cancel "
        }
        ActiveModal::None => match app.focus {
            Focus::Map => " [Click/Enter] New workout | [↑↓←→/hjkl] Pan | [+/-] Zoom | [Tab] List | [R]eset | [?] Help | [q]uit ",
            Focus::List => " [↑↓/jk] Nav | [Enter/Click] Show on map | [Tab] Map | [R]eset | [?] Help | [q]uit ",
        },
        ActiveModal::Help | ActiveModal::Alert(_) => " [Esc/Enter] Close ",
        ActiveModal::ConfirmReset => " [y] Delete everything | [n/Esc] Cancel ",
    };

    let error_text = app.last_error.as_deref().unwrap_or("");

    let status_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(80), Constraint::Percentage(20)])
        .split(area);

    let status_paragraph =
        Paragraph::new(status_text).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(status_paragraph, status_chunks[0]);

    let error_paragraph = Paragraph::new(error_text)
        .style(Style::default().bg(Color::DarkGray).fg(Color::Red))
        .alignment(Alignment::Right);
    f.render_widget(error_paragraph, status_chunks[1]);
}
