// src/workout.rs
use chrono::{DateTime, Local, Utc};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

// Last id handed out (milliseconds since epoch). Ids are bumped past this
// so two workouts created in the same millisecond never share an id.
static LAST_ID: AtomicI64 = AtomicI64::new(0);

pub(crate) fn next_id(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis();
    let prev = match LAST_ID.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
        Some(if millis > last { millis } else { last + 1 })
    }) {
        Ok(v) | Err(v) => v,
    };
    let id = if millis > prev { millis } else { prev + 1 };
    id.to_string()
}

/// Makes sure freshly generated ids sort after an id read back from storage.
pub(crate) fn observe_id(id: &str) {
    if let Ok(value) = id.parse::<i64>() {
        LAST_ID.fetch_max(value, Ordering::SeqCst);
    }
}

/// A point on the map, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both components are finite and inside the usual lat/lng ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(value: Coords) -> Self {
        [value.lat, value.lng]
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WorkoutType {
    #[default]
    Running,
    Cycling,
}

impl WorkoutType {
    /// Capitalized name used in titles ("Running", "Cycling").
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴‍♀️",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Running => Self::Cycling,
            Self::Cycling => Self::Running,
        }
    }
}

/// Variant specific data. The derived metric is computed once when the
/// workout is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WorkoutKind {
    Running { cadence: f64, pace: f64 },
    Cycling { elevation_gain: f64, speed: f64 },
}

/// A value with its display unit, e.g. `10.0 min/km`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metric {
    pub label: &'static str,
    pub value: f64,
    pub unit: &'static str,
    pub icon: &'static str,
}

// Distance over duration in hours. Running keeps calling this "pace".
fn per_hour(distance: f64, duration: f64) -> f64 {
    distance / (duration / 60.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    id: String,
    date: DateTime<Utc>,
    coords: Coords,
    distance: f64,
    duration: f64,
    kind: WorkoutKind,
}

impl Workout {
    /// Builds a new running workout. Inputs are trusted; the form validates them.
    pub fn running(coords: Coords, distance: f64, duration: f64, cadence: f64) -> Self {
        let date = Utc::now();
        Self::restore(next_id(date), date, coords, distance, duration, WorkoutType::Running, cadence)
    }

    /// Builds a new cycling workout. Inputs are trusted; the form validates them.
    pub fn cycling(coords: Coords, distance: f64, duration: f64, elevation_gain: f64) -> Self {
        let date = Utc::now();
        Self::restore(
            next_id(date),
            date,
            coords,
            distance,
            duration,
            WorkoutType::Cycling,
            elevation_gain,
        )
    }

    /// Builds a fresh workout of the given type; `secondary` is the cadence
    /// or the elevation gain.
    pub fn new(
        workout_type: WorkoutType,
        coords: Coords,
        distance: f64,
        duration: f64,
        secondary: f64,
    ) -> Self {
        match workout_type {
            WorkoutType::Running => Self::running(coords, distance, duration, secondary),
            WorkoutType::Cycling => Self::cycling(coords, distance, duration, secondary),
        }
    }

    /// Rebuilds a workout with a known id and date, recomputing its derived metric.
    pub fn restore(
        id: String,
        date: DateTime<Utc>,
        coords: Coords,
        distance: f64,
        duration: f64,
        workout_type: WorkoutType,
        secondary: f64,
    ) -> Self {
        let derived = per_hour(distance, duration);
        let kind = match workout_type {
            WorkoutType::Running => WorkoutKind::Running {
                cadence: secondary,
                pace: derived,
            },
            WorkoutType::Cycling => WorkoutKind::Cycling {
                elevation_gain: secondary,
                speed: derived,
            },
        };
        Self {
            id,
            date,
            coords,
            distance,
            duration,
            kind,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub const fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub const fn coords(&self) -> Coords {
        self.coords
    }

    /// Kilometers.
    pub const fn distance(&self) -> f64 {
        self.distance
    }

    /// Minutes.
    pub const fn duration(&self) -> f64 {
        self.duration
    }

    pub const fn kind(&self) -> &WorkoutKind {
        &self.kind
    }

    pub const fn workout_type(&self) -> WorkoutType {
        match self.kind {
            WorkoutKind::Running { .. } => WorkoutType::Running,
            WorkoutKind::Cycling { .. } => WorkoutType::Cycling,
        }
    }

    pub const fn cadence(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Running { cadence, .. } => Some(cadence),
            WorkoutKind::Cycling { .. } => None,
        }
    }

    pub const fn elevation_gain(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Cycling { elevation_gain, .. } => Some(elevation_gain),
            WorkoutKind::Running { .. } => None,
        }
    }

    pub const fn pace(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Running { pace, .. } => Some(pace),
            WorkoutKind::Cycling { .. } => None,
        }
    }

    pub const fn speed(&self) -> Option<f64> {
        match self.kind {
            WorkoutKind::Cycling { speed, .. } => Some(speed),
            WorkoutKind::Running { .. } => None,
        }
    }

    /// The cadence or elevation gain, whichever this variant carries.
    pub const fn secondary_value(&self) -> f64 {
        match self.kind {
            WorkoutKind::Running { cadence, .. } => cadence,
            WorkoutKind::Cycling { elevation_gain, .. } => elevation_gain,
        }
    }

    pub const fn derived_metric(&self) -> Metric {
        match self.kind {
            WorkoutKind::Running { pace, .. } => Metric {
                label: "pace",
                value: pace,
                unit: "min/km",
                icon: "⚡️",
            },
            WorkoutKind::Cycling { speed, .. } => Metric {
                label: "speed",
                value: speed,
                unit: "km/h",
                icon: "⚡️",
            },
        }
    }

    pub const fn secondary_metric(&self) -> Metric {
        match self.kind {
            WorkoutKind::Running { cadence, .. } => Metric {
                label: "cadence",
                value: cadence,
                unit: "spm",
                icon: "🦶🏼",
            },
            WorkoutKind::Cycling { elevation_gain, .. } => Metric {
                label: "elevation",
                value: elevation_gain,
                unit: "m",
                icon: "🗻",
            },
        }
    }

    /// Month name and day of the creation date, in local time ("April 14").
    pub fn display_date(&self) -> String {
        self.date.with_timezone(&Local).format("%B %-d").to_string()
    }

    /// Title used by list entries ("Running on April 14").
    pub fn description(&self) -> String {
        format!("{} on {}", self.workout_type().label(), self.display_date())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    const HOME: Coords = Coords::new(39.7, -105.0);

    #[test]
    fn running_keeps_stored_pace_formula() {
        let w = Workout::running(HOME, 5.0, 30.0, 80.0);
        assert_eq!(w.pace(), Some(10.0));
        assert_eq!(w.cadence(), Some(80.0));
        assert_eq!(w.speed(), None);
        assert_eq!(w.workout_type(), WorkoutType::Running);
    }

    #[test]
    fn cycling_speed_is_km_per_hour() {
        let w = Workout::cycling(HOME, 20.0, 60.0, 150.0);
        assert_eq!(w.speed(), Some(20.0));
        assert_eq!(w.elevation_gain(), Some(150.0));
        assert_eq!(w.derived_metric().unit, "km/h");
        assert_eq!(w.secondary_metric().unit, "m");
    }

    #[test]
    fn ids_are_unique_when_created_back_to_back() {
        let ids: Vec<String> = (0..200)
            .map(|_| Workout::running(HOME, 1.0, 1.0, 1.0).id().to_string())
            .collect();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
    }

    #[test]
    fn observed_ids_are_never_reissued() {
        let far_future = (Utc::now().timestamp_millis() + 10_000_000).to_string();
        observe_id(&far_future);
        let w = Workout::cycling(HOME, 1.0, 1.0, 0.0);
        assert!(w.id().parse::<i64>().unwrap() > far_future.parse::<i64>().unwrap());
    }

    #[test]
    fn restore_recomputes_derived_metric() {
        let date = Utc.with_ymd_and_hms(2024, 4, 14, 12, 0, 0).unwrap();
        let w = Workout::restore("42".into(), date, HOME, 10.0, 120.0, WorkoutType::Cycling, 300.0);
        assert_eq!(w.id(), "42");
        assert_eq!(w.speed(), Some(5.0));
        assert_eq!(w.date(), date);
    }

    #[test]
    fn workout_type_parses_case_insensitively() {
        assert_eq!(WorkoutType::from_str("Cycling").unwrap(), WorkoutType::Cycling);
        assert_eq!(WorkoutType::Running.to_string(), "running");
        assert_eq!(WorkoutType::Running.toggled(), WorkoutType::Cycling);
        assert!(WorkoutType::from_str("swimming").is_err());
    }

    #[test]
    fn coords_validity() {
        assert!(HOME.is_valid());
        assert!(!Coords::new(91.0, 0.0).is_valid());
        assert!(!Coords::new(0.0, f64::NAN).is_valid());
        assert_eq!(Coords::from([1.0, 2.0]), Coords::new(1.0, 2.0));
    }
}
