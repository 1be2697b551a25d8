// mapty-tui/src/ui/map.rs
use crate::{
    app::{App, Focus},
    ui::layout::tui_color,
};
use mapty_lib::MarkerStyle;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style, Stylize},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map, MapResolution},
        Block, Borders, Paragraph, Wrap,
    },
    Frame,
};

pub fn render_map(f: &mut Frame, app: &mut App, area: Rect) {
    let title = match app.core.map().current_center() {
        Some(center) => format!(" Map ({center}, zoom {}) ", app.core.map().zoom()),
        None => " Map ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(if app.focus == Focus::Map {
            Style::new().yellow()
        } else {
            Style::new()
        });
    let inner = block.inner(area);
    app.map_area = inner;
    let map = app.core.map();

    let Some(viewport) = map.viewport(inner) else {
        let hint = vec![
            Line::from(""),
            Line::from("Could not get your location.").style(Style::new().bold()),
            Line::from(""),
            Line::from("Set one with `mapty set-home <lat> <lng>` and restart."),
        ];
        let paragraph = Paragraph::new(hint)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
        return;
    };

    let theme = &app.core.config.theme;
    let pending = app.core.form().pending_coords();
    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Braille)
        .x_bounds(viewport.lng_bounds)
        .y_bounds(viewport.lat_bounds)
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();
            for marker in map.markers() {
                let (symbol, color) = match marker.style {
                    MarkerStyle::Home => ("◆", Color::White),
                    MarkerStyle::Workout(kind) => ("●", tui_color(theme.color_for(kind))),
                };
                // Popups stay open next to their marker.
                ctx.print(
                    marker.coords.lng,
                    marker.coords.lat,
                    Span::styled(format!("{symbol} {}", marker.popup), Style::new().fg(color)),
                );
            }
            if let Some(coords) = pending {
                ctx.print(coords.lng, coords.lat, Span::styled("✚", Style::new().red().bold()));
            }
        });
    f.render_widget(canvas, area);
}
