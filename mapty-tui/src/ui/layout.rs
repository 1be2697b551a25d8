// mapty-tui/src/ui/layout.rs
use crate::{
    app::{ActiveModal, App},
    ui::{
        form::render_form, list::render_list, map::render_map, modals::render_modal,
        status_bar::render_status_bar,
    },
};
use mapty_lib::StandardColor;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
    Frame,
};

pub fn render_ui(f: &mut Frame, app: &mut App) {
    let size = f.size();

    // Content on top, status bar at the bottom
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(size);

    // Sidebar (form + list) on the left, map on the right
    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(38), Constraint::Percentage(62)])
        .split(main_chunks[0]);

    render_sidebar(f, app, content_chunks[0]);
    render_map(f, app, content_chunks[1]);
    render_status_bar(f, app, main_chunks[1]);

    if app.active_modal != ActiveModal::None {
        render_modal(f, app);
    }
}

fn render_sidebar(f: &mut Frame, app: &mut App, area: Rect) {
    if app.core.form().is_visible() {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(0)])
            .split(area);
        render_form(f, app, chunks[0]);
        render_list(f, app, chunks[1]);
    } else {
        render_list(f, app, area);
    }
}

/// Maps a theme color onto the terminal palette.
pub fn tui_color(color: StandardColor) -> Color {
    match color {
        StandardColor::Black => Color::Black,
        StandardColor::Red => Color::LightRed,
        StandardColor::Green => Color::LightGreen,
        StandardColor::Yellow => Color::LightYellow,
        StandardColor::Blue => Color::LightBlue,
        StandardColor::Magenta => Color::LightMagenta,
        StandardColor::Cyan => Color::LightCyan,
        StandardColor::White => Color::White,
        StandardColor::DarkGrey => Color::DarkGray,
        StandardColor::DarkRed => Color::Red,
        StandardColor::DarkGreen => Color::Green,
        StandardColor::DarkYellow => Color::Yellow,
        StandardColor::DarkBlue => Color::Blue,
        StandardColor::DarkMagenta => Color::Magenta,
        StandardColor::DarkCyan => Color::Cyan,
        StandardColor::Grey => Color::Gray,
    }
}

/// Helper function to create a centered rectangle for modals
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let percent_x = percent_x.min(100);
    let percent_y = percent_y.min(100);
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
