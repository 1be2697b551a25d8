// src/render.rs
use crate::ports::WorkoutList;
use crate::workout::{Metric, Workout};
use std::fmt;

/// Markup for one list entry. Carries the id of the workout it was rendered
/// from so a click on the entry can be resolved back to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupFragment {
    workout_id: String,
    html: String,
}

impl MarkupFragment {
    pub fn workout_id(&self) -> &str {
        &self.workout_id
    }

    pub fn as_html(&self) -> &str {
        &self.html
    }
}

impl fmt::Display for MarkupFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.html)
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn push_detail(html: &mut String, icon: &str, value: &str, unit: &str) {
    html.push_str(&format!(
        "\n  <div class=\"workout__details\">\n    <span class=\"workout__icon\">{icon}</span>\n    <span class=\"workout__value\">{value}</span>\n    <span class=\"workout__unit\">{unit}</span>\n  </div>"
    ));
}

fn push_metric(html: &mut String, metric: Metric) {
    push_detail(html, metric.icon, &format!("{:.1}", metric.value), metric.unit);
}

/// Renders the list entry for a workout.
pub fn render(workout: &Workout) -> MarkupFragment {
    let workout_type = workout.workout_type();
    let mut html = format!(
        "<li class=\"workout workout--{workout_type}\" data-id=\"{}\">\n  <h2 class=\"workout__title\">{}</h2>",
        escape(workout.id()),
        escape(&workout.description()),
    );
    push_detail(&mut html, workout_type.icon(), &workout.distance().to_string(), "km");
    push_detail(&mut html, "⏱", &workout.duration().to_string(), "min");
    push_metric(&mut html, workout.derived_metric());
    push_metric(&mut html, workout.secondary_metric());
    html.push_str("\n</li>");

    MarkupFragment {
        workout_id: workout.id().to_string(),
        html,
    }
}

/// Text shown in the popup attached to a workout's map marker
/// ("Running April 14").
pub fn popup_content(workout: &Workout) -> String {
    format!("{} {}", workout.workout_type().label(), workout.display_date())
}

/// In-memory list container. Entries are kept in the order they were
/// appended.
#[derive(Debug, Default, Clone)]
pub struct HtmlList {
    entries: Vec<MarkupFragment>,
}

impl HtmlList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[MarkupFragment] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Workout id of the entry at `index`, as a click on that entry would report it.
    pub fn id_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(MarkupFragment::workout_id)
    }

    /// The whole container as an HTML `<ul>`.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<ul class=\"workouts\">\n");
        for entry in &self.entries {
            html.push_str(entry.as_html());
            html.push('\n');
        }
        html.push_str("</ul>\n");
        html
    }
}

impl WorkoutList for HtmlList {
    fn append(&mut self, fragment: MarkupFragment) {
        self.entries.push(fragment);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}
