// mapty-tui/src/ui/list.rs
use crate::{
    app::{App, Focus},
    ui::layout::tui_color,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn render_list(f: &mut Frame, app: &mut App, area: Rect) {
    app.list_area = area;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Workouts ({}) ", app.core.list().len()))
        .border_style(if app.focus == Focus::List {
            Style::new().yellow()
        } else {
            Style::new()
        });

    if app.core.list().is_empty() {
        let hint = Paragraph::new("Click on the map to log a workout.")
            .block(block)
            .style(Style::new().italic());
        f.render_widget(hint, area);
        return;
    }

    let theme = &app.core.config.theme;
    // Entries are drawn from the list port so order and ids match it exactly.
    let items: Vec<ListItem> = app
        .core
        .list()
        .entries()
        .iter()
        .filter_map(|entry| app.core.workout(entry.workout_id()))
        .map(|w| {
            let color = tui_color(theme.color_for(w.workout_type()));
            let derived = w.derived_metric();
            let secondary = w.secondary_metric();
            ListItem::new(vec![
                Line::from(Span::styled(
                    w.description(),
                    Style::new().fg(color).add_modifier(Modifier::BOLD),
                )),
                Line::from(format!(
                    "  {} km · {} min · {:.1} {} · {:.1} {}",
                    w.distance(),
                    w.duration(),
                    derived.value,
                    derived.unit,
                    secondary.value,
                    secondary.unit
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::new().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, area, &mut app.list_state);
}
