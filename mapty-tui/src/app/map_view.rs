// mapty-tui/src/app/map_view.rs
use mapty_lib::{Coords, MapView, Marker, MarkerStyle, MAX_MAP_ZOOM};
use ratatui::layout::Rect;
use std::time::{Duration, Instant};

const PAN_DURATION: Duration = Duration::from_secs(1);

/// Geographic window shown in a canvas of a given size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub lng_bounds: [f64; 2],
    pub lat_bounds: [f64; 2],
}

impl Viewport {
    /// At zoom 0 the full 360 degrees of longitude fit the width; every
    /// zoom level halves that. Terminal cells are about twice as tall as
    /// they are wide, which the latitude span accounts for.
    pub fn new(center: Coords, zoom: u8, area: Rect) -> Self {
        let lng_span = 360.0 / 2f64.powi(i32::from(zoom));
        let width = f64::from(area.width.max(1));
        let height = f64::from(area.height.max(1));
        let lat_span = lng_span * (height * 2.0) / width;
        Self {
            lng_bounds: [center.lng - lng_span / 2.0, center.lng + lng_span / 2.0],
            lat_bounds: [center.lat - lat_span / 2.0, center.lat + lat_span / 2.0],
        }
    }

    pub fn lng_span(&self) -> f64 {
        self.lng_bounds[1] - self.lng_bounds[0]
    }

    pub fn lat_span(&self) -> f64 {
        self.lat_bounds[1] - self.lat_bounds[0]
    }

    /// Coordinates under the terminal cell (`column`, `row`) of `area`.
    pub fn coords_at(&self, area: Rect, column: u16, row: u16) -> Option<Coords> {
        if area.width == 0
            || area.height == 0
            || column < area.x
            || row < area.y
            || column >= area.x + area.width
            || row >= area.y + area.height
        {
            return None;
        }
        let x_frac = (f64::from(column - area.x) + 0.5) / f64::from(area.width);
        let y_frac = (f64::from(row - area.y) + 0.5) / f64::from(area.height);
        let lng = self.lng_bounds[0] + x_frac * self.lng_span();
        let lat = self.lat_bounds[1] - y_frac * self.lat_span();
        Some(Coords::new(lat.clamp(-90.0, 90.0), wrap_lng(lng)))
    }
}

fn wrap_lng(lng: f64) -> f64 {
    let wrapped = (lng + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && lng > 0.0 {
        180.0
    } else {
        wrapped
    }
}

#[derive(Debug, Clone, Copy)]
struct Pan {
    from: Coords,
    started: Instant,
}

/// Map drawn on a ratatui canvas.
#[derive(Debug, Default)]
pub struct CanvasMap {
    center: Option<Coords>,
    zoom: u8,
    markers: Vec<Marker>,
    pan: Option<Pan>,
}

impl CanvasMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.center.is_some()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub const fn zoom(&self) -> u8 {
        self.zoom
    }

    /// Where the map is headed, ignoring any pan still in progress.
    pub const fn target_center(&self) -> Option<Coords> {
        self.center
    }

    /// Where the map is looking right now, following an animated pan if one
    /// is in progress.
    pub fn current_center(&self) -> Option<Coords> {
        let target = self.center?;
        let Some(pan) = self.pan else {
            return Some(target);
        };
        let t = pan.started.elapsed().as_secs_f64() / PAN_DURATION.as_secs_f64();
        if t >= 1.0 {
            return Some(target);
        }
        // Ease out so the pan slows down near the target.
        let eased = 1.0 - (1.0 - t).powi(3);
        Some(Coords::new(
            pan.from.lat + (target.lat - pan.from.lat) * eased,
            pan.from.lng + (target.lng - pan.from.lng) * eased,
        ))
    }

    pub fn viewport(&self, area: Rect) -> Option<Viewport> {
        self.current_center()
            .map(|center| Viewport::new(center, self.zoom, area))
    }

    /// Moves the view by a fraction of the visible span.
    pub fn pan_by(&mut self, area: Rect, lat_steps: f64, lng_steps: f64) {
        let Some(viewport) = self.viewport(area) else {
            return;
        };
        if let Some(center) = self.current_center() {
            let lat = (center.lat + lat_steps * viewport.lat_span() / 8.0).clamp(-90.0, 90.0);
            let lng = wrap_lng(center.lng + lng_steps * viewport.lng_span() / 8.0);
            self.center = Some(Coords::new(lat, lng));
            self.pan = None;
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1).min(MAX_MAP_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1);
    }
}

impl MapView for CanvasMap {
    fn init(&mut self, center: Coords, zoom: u8) {
        self.center = Some(center);
        self.zoom = zoom.min(MAX_MAP_ZOOM);
        self.pan = None;
    }

    fn add_marker(&mut self, coords: Coords, popup: &str, style: MarkerStyle) {
        self.markers.push(Marker {
            coords,
            popup: popup.to_string(),
            style,
        });
    }

    fn center_on(&mut self, coords: Coords, zoom: u8, animated: bool) {
        self.pan = match (animated, self.current_center()) {
            (true, Some(from)) => Some(Pan {
                from,
                started: Instant::now(),
            }),
            _ => None,
        };
        self.center = Some(coords);
        self.zoom = zoom.min(MAX_MAP_ZOOM);
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}
