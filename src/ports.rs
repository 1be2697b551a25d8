// src/ports.rs
//! Interfaces the app controller drives, plus the small implementations
//! the library ships for headless use.
use crate::render::MarkupFragment;
use crate::workout::{Coords, WorkoutType};
use thiserror::Error;

/// Popup styling hint, mirrors the marker's workout type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    Home,
    Workout(WorkoutType),
}

/// What the controller needs from a map widget. Clicks are pushed into
/// the controller by the surface hosting the map.
pub trait MapView {
    /// Sets up the map centered on `center`. Returning means the map is ready.
    fn init(&mut self, center: Coords, zoom: u8);
    fn add_marker(&mut self, coords: Coords, popup: &str, style: MarkerStyle);
    fn center_on(&mut self, coords: Coords, zoom: u8, animated: bool);
    /// Drops every marker and forgets the view.
    fn clear(&mut self);
}

/// Container that list entries are appended to.
pub trait WorkoutList {
    fn append(&mut self, fragment: MarkupFragment);
    fn clear(&mut self);
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("Location is not available on this device.")]
    Unavailable,
    #[error("Permission to read the location was denied.")]
    Denied,
}

/// One-shot position lookup used at startup.
pub trait GeolocationProvider {
    fn current_position(&self) -> Result<Coords, GeolocationError>;
}

/// Always answers with the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coords);

impl GeolocationProvider for FixedLocation {
    fn current_position(&self) -> Result<Coords, GeolocationError> {
        Ok(self.0)
    }
}

/// Answers with the home location from the config, if one is set.
#[derive(Debug, Clone, Copy)]
pub struct ConfiguredLocation {
    home: Option<Coords>,
}

impl ConfiguredLocation {
    pub const fn new(home: Option<Coords>) -> Self {
        Self { home }
    }
}

impl GeolocationProvider for ConfiguredLocation {
    fn current_position(&self) -> Result<Coords, GeolocationError> {
        self.home.ok_or(GeolocationError::Unavailable)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub coords: Coords,
    pub popup: String,
    pub style: MarkerStyle,
}

/// Map that only records what it was asked to do.
#[derive(Debug, Default, Clone)]
pub struct RecordingMap {
    pub view: Option<(Coords, u8)>,
    pub markers: Vec<Marker>,
    /// Every `center_on` call, oldest first.
    pub moves: Vec<(Coords, u8, bool)>,
}

impl RecordingMap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MapView for RecordingMap {
    fn init(&mut self, center: Coords, zoom: u8) {
        self.view = Some((center, zoom));
    }

    fn add_marker(&mut self, coords: Coords, popup: &str, style: MarkerStyle) {
        self.markers.push(Marker {
            coords,
            popup: popup.to_string(),
            style,
        });
    }

    fn center_on(&mut self, coords: Coords, zoom: u8, animated: bool) {
        self.view = Some((coords, zoom));
        self.moves.push((coords, zoom, animated));
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}
