// src/form.rs
use crate::workout::{Coords, Workout, WorkoutType};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be a positive number (got '{raw}').")]
    NotPositive { field: FormField, raw: String },
    #[error("{field} must be a number (got '{raw}').")]
    NotANumber { field: FormField, raw: String },
    #[error("Pick a location on the map first.")]
    NoLocationSelected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum FormField {
    Distance,
    Duration,
    Cadence,
    #[strum(serialize = "Elevation gain")]
    Elevation,
}

impl FormField {
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Distance => "km",
            Self::Duration => "min",
            Self::Cadence => "step/min",
            Self::Elevation => "meters",
        }
    }
}

/// Coerces raw input the way a numeric text box does: blank is zero,
/// anything unparsable is NaN.
pub fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn positive(field: FormField, raw: &str) -> Result<f64, ValidationError> {
    let value = coerce_number(raw);
    if !value.is_finite() {
        return Err(ValidationError::NotANumber {
            field,
            raw: raw.to_string(),
        });
    }
    if value <= 0.0 {
        return Err(ValidationError::NotPositive {
            field,
            raw: raw.to_string(),
        });
    }
    Ok(value)
}

// Cadence and elevation only need to be finite; zero and negatives pass.
fn finite(field: FormField, raw: &str) -> Result<f64, ValidationError> {
    let value = coerce_number(raw);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotANumber {
            field,
            raw: raw.to_string(),
        })
    }
}

/// State of the new-workout form.
#[derive(Debug, Clone, Default)]
pub struct FormController {
    visible: bool,
    workout_type: WorkoutType,
    pending_coords: Option<Coords>,
    distance: String,
    duration: String,
    cadence: String,
    elevation: String,
    focused: Option<FormField>,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub const fn workout_type(&self) -> WorkoutType {
        self.workout_type
    }

    pub const fn pending_coords(&self) -> Option<Coords> {
        self.pending_coords
    }

    pub const fn focused(&self) -> Option<FormField> {
        self.focused
    }

    /// Opens the form for a workout at `coords` with the distance input focused.
    pub fn show_for_coordinates(&mut self, coords: Coords) {
        self.pending_coords = Some(coords);
        self.visible = true;
        self.focused = Some(FormField::Distance);
    }

    /// Switches between running and cycling, swapping the cadence and
    /// elevation rows.
    pub fn handle_variant_change(&mut self) {
        self.set_workout_type(self.workout_type.toggled());
    }

    pub fn set_workout_type(&mut self, workout_type: WorkoutType) {
        self.workout_type = workout_type;
        if matches!(self.focused, Some(FormField::Cadence | FormField::Elevation)) {
            self.focused = Some(self.secondary_field());
        }
    }

    /// The variant specific row currently shown. Exactly one of cadence and
    /// elevation is visible at any time.
    pub const fn secondary_field(&self) -> FormField {
        match self.workout_type {
            WorkoutType::Running => FormField::Cadence,
            WorkoutType::Cycling => FormField::Elevation,
        }
    }

    pub const fn visible_fields(&self) -> [FormField; 3] {
        [FormField::Distance, FormField::Duration, self.secondary_field()]
    }

    pub fn input(&self, field: FormField) -> &str {
        match field {
            FormField::Distance => &self.distance,
            FormField::Duration => &self.duration,
            FormField::Cadence => &self.cadence,
            FormField::Elevation => &self.elevation,
        }
    }

    fn input_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Distance => &mut self.distance,
            FormField::Duration => &mut self.duration,
            FormField::Cadence => &mut self.cadence,
            FormField::Elevation => &mut self.elevation,
        }
    }

    pub fn set_input(&mut self, field: FormField, value: impl Into<String>) {
        *self.input_mut(field) = value.into();
    }

    /// Appends a character to the focused input.
    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.focused {
            self.input_mut(field).push(c);
        }
    }

    /// Removes the last character of the focused input.
    pub fn pop_char(&mut self) {
        if let Some(field) = self.focused {
            self.input_mut(field).pop();
        }
    }

    pub fn focus_next(&mut self) {
        let fields = self.visible_fields();
        let next = match self.focused.and_then(|f| fields.iter().position(|x| *x == f)) {
            Some(i) => fields[(i + 1) % fields.len()],
            None => fields[0],
        };
        self.focused = Some(next);
    }

    pub fn focus_previous(&mut self) {
        let fields = self.visible_fields();
        let prev = match self.focused.and_then(|f| fields.iter().position(|x| *x == f)) {
            Some(0) | None => fields[fields.len() - 1],
            Some(i) => fields[i - 1],
        };
        self.focused = Some(prev);
    }

    /// Validates the inputs of the selected variant and builds the workout.
    /// The form itself is left untouched so the user can correct mistakes;
    /// callers hide it on success.
    pub fn handle_submit(&self) -> Result<Workout, ValidationError> {
        let distance = positive(FormField::Distance, &self.distance)?;
        let duration = positive(FormField::Duration, &self.duration)?;
        let secondary_field = self.secondary_field();
        let secondary = finite(secondary_field, self.input(secondary_field))?;
        let coords = self
            .pending_coords
            .ok_or(ValidationError::NoLocationSelected)?;

        Ok(Workout::new(
            self.workout_type,
            coords,
            distance,
            duration,
            secondary,
        ))
    }

    /// Empties every numeric input.
    pub fn clear_fields(&mut self) {
        self.distance.clear();
        self.duration.clear();
        self.cadence.clear();
        self.elevation.clear();
    }

    /// Clears and hides the form. The selected variant is kept so the next
    /// show opens the same way.
    pub fn hide(&mut self) {
        self.clear_fields();
        self.visible = false;
        self.focused = None;
        self.pending_coords = None;
    }
}
