// mapty-tui/src/ui/form.rs
use crate::app::App;
use mapty_lib::{FormField, WorkoutType};
use ratatui::{
    layout::Rect,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const LABEL_WIDTH: usize = 16;

pub fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let form = app.core.form();
    let title = match form.pending_coords() {
        Some(coords) => format!(" New workout at {coords} "),
        None => " New workout ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::new().yellow());
    let inner = block.inner(area);

    let type_spans: Vec<Span> = [WorkoutType::Running, WorkoutType::Cycling]
        .into_iter()
        .map(|kind| {
            let label = format!(" {} ", kind.label());
            if kind == form.workout_type() {
                Span::styled(label, Style::new().black().on_yellow().bold())
            } else {
                Span::raw(label)
            }
        })
        .collect();
    let mut lines = vec![Line::from(
        std::iter::once(Span::raw(format!("{:<LABEL_WIDTH$}", "Type")))
            .chain(type_spans)
            .collect::<Vec<_>>(),
    )];

    let mut cursor = None;
    for (row, field) in form.visible_fields().into_iter().enumerate() {
        let value = form.input(field);
        let focused = form.focused() == Some(field);
        let label = format!("{:<LABEL_WIDTH$}", field.to_string());
        let value_style = if focused {
            Style::new().yellow().bold()
        } else {
            Style::new()
        };
        let shown = if value.is_empty() && !focused {
            Span::styled(placeholder(field), Style::new().dark_gray())
        } else {
            Span::styled(value.to_string(), value_style)
        };
        if focused {
            let x = inner.x + (LABEL_WIDTH + value.chars().count()) as u16;
            // Row 0 holds the type selector
            let y = inner.y + 1 + row as u16;
            cursor = Some((x.min(inner.right().saturating_sub(1)), y));
        }
        lines.push(Line::from(vec![
            Span::raw(label),
            shown,
            Span::raw(" "),
            Span::styled(field.unit(), Style::new().dark_gray()),
        ]));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
    if let Some((x, y)) = cursor {
        f.set_cursor(x, y);
    }
}

fn placeholder(field: FormField) -> &'static str {
    match field {
        FormField::Distance => "5",
        FormField::Duration => "30",
        FormField::Cadence => "170",
        FormField::Elevation => "120",
    }
}
