// src/lib.rs
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

// --- Declare modules ---
mod config;
pub mod db;
pub mod form;
pub mod ports;
pub mod render;
pub mod storage;
pub mod workout;

// --- Expose public types ---
pub use config::{
    get_config_path as get_config_path_util, load as load_config_util, parse_color,
    save as save_config_util, Config, Error as ConfigError, Home, StandardColor, Theme,
    DEFAULT_MAP_ZOOM, MAX_MAP_ZOOM,
};
pub use db::{get_db_path as get_db_path_util, Error as DbError, KeyValueStore, SqliteStore};
pub use form::{FormController, FormField, ValidationError};
pub use ports::{
    ConfiguredLocation, FixedLocation, GeolocationError, GeolocationProvider, MapView, Marker,
    MarkerStyle, RecordingMap, WorkoutList,
};
pub use render::{popup_content, render, HtmlList, MarkupFragment};
pub use storage::{StorageError, WorkoutStore};
pub use workout::{Coords, Metric, Workout, WorkoutKind, WorkoutType};

pub const HOME_POPUP: &str = "Home";

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Owns the workout list and drives the map, the list and storage.
pub struct App<K: KeyValueStore, M: MapView, L: WorkoutList> {
    pub config: Config,
    pub config_path: PathBuf,
    pub db_path: PathBuf,
    store: WorkoutStore<K>,
    map: M,
    list: L,
    form: FormController,
    workouts: Vec<Workout>,
    map_ready: bool,
}

impl<M: MapView, L: WorkoutList> App<SqliteStore, M, L> {
    /// Loads the config and opens the on-disk store.
    /// # Errors
    /// Returns `anyhow::Error` if config/db path determination, loading, or opening fails.
    pub fn initialize(map: M, list: L) -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"))?;

        let db_path = db::get_db_path().context("Failed to determine database path")?;
        let backend = SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open database at {db_path:?}"))?;
        let store = WorkoutStore::with_key(backend, config.storage_key.clone());

        let mut app = Self::new(config, store, map, list);
        app.config_path = config_path;
        app.db_path = db_path;
        Ok(app)
    }
}

impl<K: KeyValueStore, M: MapView, L: WorkoutList> App<K, M, L> {
    pub fn new(config: Config, store: WorkoutStore<K>, map: M, list: L) -> Self {
        Self {
            config,
            config_path: PathBuf::new(),
            db_path: PathBuf::new(),
            store,
            map,
            list,
            form: FormController::new(),
            workouts: Vec::new(),
            map_ready: false,
        }
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    /// Saves the current configuration state.
    /// # Errors
    /// Returns `ConfigError` if saving fails.
    pub fn save_config(&self) -> Result<(), ConfigError> {
        config::save(&self.config_path, &self.config)
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn workout(&self, id: &str) -> Option<&Workout> {
        self.workouts.iter().find(|w| w.id() == id)
    }

    pub const fn form(&self) -> &FormController {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormController {
        &mut self.form
    }

    pub const fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub const fn list(&self) -> &L {
        &self.list
    }

    pub const fn store(&self) -> &WorkoutStore<K> {
        &self.store
    }

    /// Tears the app down, handing back its storage.
    pub fn into_store(self) -> WorkoutStore<K> {
        self.store
    }

    pub const fn is_map_ready(&self) -> bool {
        self.map_ready
    }

    /// Rehydrates stored workouts into the list, then tries to bring up the
    /// map around the current position. A missing position is logged and the
    /// app carries on without a map. Returns the position the map was
    /// centered on, if any.
    pub fn start(&mut self, geo: &dyn GeolocationProvider) -> Option<Coords> {
        self.workouts = self.store.load();
        for workout in &self.workouts {
            self.list.append(render(workout));
        }

        match geo.current_position() {
            Ok(position) => {
                self.load_map(position);
                Some(position)
            }
            Err(e) => {
                warn!(error = %e, "could not get your location, map disabled");
                None
            }
        }
    }

    fn load_map(&mut self, position: Coords) {
        self.map.init(position, self.config.map_zoom);
        self.map.add_marker(position, HOME_POPUP, MarkerStyle::Home);
        for workout in &self.workouts {
            self.map.add_marker(
                workout.coords(),
                &popup_content(workout),
                MarkerStyle::Workout(workout.workout_type()),
            );
        }
        self.map_ready = true;
        info!(%position, markers = self.workouts.len(), "map ready");
    }

    /// A click on the map opens the form for that spot. Ignored until the
    /// map is ready.
    pub fn handle_map_click(&mut self, coords: Coords) {
        if !self.map_ready {
            debug!(%coords, "map click before map is ready, ignoring");
            return;
        }
        self.form.show_for_coordinates(coords);
    }

    pub fn handle_variant_change(&mut self) {
        self.form.handle_variant_change();
    }

    /// Validates the form and records the workout: list entry, marker,
    /// storage. On a validation error nothing changes and the form keeps
    /// its input.
    /// # Errors
    /// - `Error::Validation` if the form input is invalid.
    /// - `Error::Storage` if persisting fails; the workout is still kept in memory.
    pub fn handle_submit(&mut self) -> Result<&Workout, Error> {
        let workout = self.form.handle_submit()?;

        if self.map_ready {
            self.map.add_marker(
                workout.coords(),
                &popup_content(&workout),
                MarkerStyle::Workout(workout.workout_type()),
            );
        }
        self.list.append(render(&workout));
        info!(id = workout.id(), kind = %workout.workout_type(), "workout added");
        self.workouts.push(workout);
        self.form.hide();

        self.store.save(&self.workouts)?;
        let last = self.workouts.len() - 1;
        Ok(&self.workouts[last])
    }

    /// Moves the map to the workout with `id`. Unknown ids (or no map) are
    /// a no-op; returns whether the map moved.
    pub fn center_on_workout(&mut self, id: &str) -> bool {
        if !self.map_ready {
            debug!(id, "center requested without a map");
            return false;
        }
        let Some(coords) = self.workout(id).map(Workout::coords) else {
            debug!(id, "no workout with this id");
            return false;
        };
        self.map.center_on(coords, self.config.map_zoom, true);
        true
    }

    /// Wipes stored and in-memory workouts and starts over, as a fresh
    /// launch with no data would.
    /// # Errors
    /// Returns `StorageError` if the slot cannot be cleared.
    pub fn reset(&mut self, geo: &dyn GeolocationProvider) -> Result<Option<Coords>, Error> {
        self.store.clear()?;
        self.workouts.clear();
        self.list.clear();
        self.map.clear();
        self.map_ready = false;
        self.form = FormController::new();
        info!("all workouts cleared");
        Ok(self.start(geo))
    }
}
