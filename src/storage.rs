// src/storage.rs
use crate::db::{self, KeyValueStore};
use crate::workout::{self, Coords, Workout, WorkoutKind, WorkoutType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_STORAGE_KEY: &str = "workouts";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage backend failed: {0}")]
    Backend(#[from] db::Error),
    #[error("Failed to encode workouts (JSON): {0}")]
    Encode(#[from] serde_json::Error),
}

// One persisted workout. Derived values are written out but recomputed on
// load; `id` and `date` are regenerated when missing.
#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type", rename_all = "lowercase")]
enum StoredWorkout {
    Running {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        date: Option<DateTime<Utc>>,
        coords: [f64; 2],
        distance: f64,
        duration: f64,
        cadence: f64,
        #[serde(default, skip_deserializing)]
        pace: f64,
    },
    Cycling {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        date: Option<DateTime<Utc>>,
        coords: [f64; 2],
        distance: f64,
        duration: f64,
        #[serde(rename = "elevationGain")]
        elevation_gain: f64,
        #[serde(default, skip_deserializing)]
        speed: f64,
    },
}

impl From<&Workout> for StoredWorkout {
    fn from(w: &Workout) -> Self {
        let id = Some(w.id().to_string());
        let date = Some(w.date());
        let coords = w.coords().into();
        let (distance, duration) = (w.distance(), w.duration());
        match *w.kind() {
            WorkoutKind::Running { cadence, pace } => Self::Running {
                id,
                date,
                coords,
                distance,
                duration,
                cadence,
                pace,
            },
            WorkoutKind::Cycling {
                elevation_gain,
                speed,
            } => Self::Cycling {
                id,
                date,
                coords,
                distance,
                duration,
                elevation_gain,
                speed,
            },
        }
    }
}

impl StoredWorkout {
    // Keeps the stored id unless an earlier record already claimed it.
    fn into_workout(self, seen: &mut HashSet<String>) -> Workout {
        let (id, date, coords, distance, duration, workout_type, secondary) = match self {
            Self::Running {
                id,
                date,
                coords,
                distance,
                duration,
                cadence,
                ..
            } => (id, date, coords, distance, duration, WorkoutType::Running, cadence),
            Self::Cycling {
                id,
                date,
                coords,
                distance,
                duration,
                elevation_gain,
                ..
            } => (id, date, coords, distance, duration, WorkoutType::Cycling, elevation_gain),
        };
        let id = match id {
            Some(id) if seen.insert(id.clone()) => id,
            Some(id) => {
                let fresh = workout::next_id(Utc::now());
                warn!(%id, new_id = %fresh, "duplicate stored workout id, assigning a new one");
                seen.insert(fresh.clone());
                fresh
            }
            None => {
                let fresh = workout::next_id(Utc::now());
                seen.insert(fresh.clone());
                fresh
            }
        };
        let date = date.unwrap_or_else(Utc::now);
        Workout::restore(
            id,
            date,
            Coords::from(coords),
            distance,
            duration,
            workout_type,
            secondary,
        )
    }

    fn id(&self) -> Option<&str> {
        match self {
            Self::Running { id, .. } | Self::Cycling { id, .. } => id.as_deref(),
        }
    }
}

/// Saves and loads the whole workout list as one JSON slot.
pub struct WorkoutStore<K: KeyValueStore> {
    backend: K,
    key: String,
}

impl<K: KeyValueStore> WorkoutStore<K> {
    pub fn new(backend: K) -> Self {
        Self::with_key(backend, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(backend: K, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &K {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut K {
        &mut self.backend
    }

    /// Replaces the stored snapshot with `workouts`.
    /// # Errors
    /// Returns `StorageError` if encoding or the backend write fails.
    pub fn save(&mut self, workouts: &[Workout]) -> Result<(), StorageError> {
        let records: Vec<StoredWorkout> = workouts.iter().map(StoredWorkout::from).collect();
        let json = serde_json::to_string(&records)?;
        self.backend.set(&self.key, &json)?;
        debug!(key = %self.key, count = workouts.len(), "saved workouts");
        Ok(())
    }

    /// Reads the stored workouts. A missing, empty, unreadable or corrupted
    /// slot yields an empty list.
    pub fn load(&self) -> Vec<Workout> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "could not read stored workouts");
                return Vec::new();
            }
        };
        if raw.trim().is_empty() || raw.trim() == "null" {
            return Vec::new();
        }
        match serde_json::from_str::<Vec<StoredWorkout>>(&raw) {
            Ok(records) => {
                // Observe every stored id first so regenerated ids sort past all of them.
                for id in records.iter().filter_map(StoredWorkout::id) {
                    workout::observe_id(id);
                }
                let mut seen = HashSet::new();
                let workouts: Vec<Workout> = records
                    .into_iter()
                    .map(|record| record.into_workout(&mut seen))
                    .collect();
                info!(key = %self.key, count = workouts.len(), "loaded workouts");
                workouts
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "stored workouts are corrupted, starting empty");
                Vec::new()
            }
        }
    }

    /// Erases the slot.
    /// # Errors
    /// Returns `StorageError` if the backend delete fails.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.backend.remove(&self.key)?;
        info!(key = %self.key, "cleared stored workouts");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;

    fn store() -> WorkoutStore<SqliteStore> {
        WorkoutStore::new(SqliteStore::open_in_memory().unwrap())
    }

    #[test]
    fn record_layout_uses_type_tag_and_coords_pair() {
        let mut store = store();
        let w = Workout::cycling(Coords::new(1.5, 2.5), 20.0, 60.0, 150.0);
        store.save(std::slice::from_ref(&w)).unwrap();
        let raw = store.backend().get("workouts").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let record = &value[0];
        assert_eq!(record["type"], "cycling");
        assert_eq!(record["coords"], serde_json::json!([1.5, 2.5]));
        assert_eq!(record["elevationGain"], 150.0);
        assert_eq!(record["speed"], 20.0);
        assert_eq!(record["id"], w.id());
    }

    #[test]
    fn loads_records_written_by_the_browser_app() {
        let mut store = store();
        let legacy = r#"[
            {"date":"2023-05-01T08:30:00.000Z","id":"2929400000","coords":[45.0,7.6],
             "distance":5,"duration":30,"type":"running","cadence":170,"pace":10},
            {"coords":[45.1,7.7],"distance":20,"duration":60,"type":"cycling","elevationGain":-10}
        ]"#;
        store.backend_mut().set("workouts", legacy).unwrap();

        let workouts = store.load();
        assert_eq!(workouts.len(), 2);
        assert_eq!(workouts[0].id(), "2929400000");
        assert_eq!(workouts[0].pace(), Some(10.0));
        assert_eq!(workouts[0].cadence(), Some(170.0));
        assert_eq!(workouts[1].workout_type(), WorkoutType::Cycling);
        assert_eq!(workouts[1].elevation_gain(), Some(-10.0));
        assert!(!workouts[1].id().is_empty());
    }

    #[test]
    fn stored_derived_values_are_ignored() {
        let mut store = store();
        store
            .backend_mut()
            .set(
                "workouts",
                r#"[{"coords":[0,0],"distance":10,"duration":30,"type":"running","cadence":1,"pace":999}]"#,
            )
            .unwrap();
        assert_eq!(store.load()[0].pace(), Some(20.0));
    }

    #[test]
    fn corrupted_or_missing_slot_is_empty() {
        let mut store = store();
        assert!(store.load().is_empty());
        store.backend_mut().set("workouts", "{not json").unwrap();
        assert!(store.load().is_empty());
        store.backend_mut().set("workouts", "null").unwrap();
        assert!(store.load().is_empty());
        store
            .backend_mut()
            .set("workouts", r#"[{"type":"swimming","coords":[0,0],"distance":1,"duration":1}]"#)
            .unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn duplicate_stored_ids_are_reassigned() {
        let mut store = store();
        let raw = r#"[
            {"id":"1234567890","date":"2023-05-01T08:30:00.000Z","coords":[1,1],
             "distance":5,"duration":30,"type":"running","cadence":170},
            {"id":"1234567890","date":"2023-05-02T08:30:00.000Z","coords":[2,2],
             "distance":20,"duration":60,"type":"cycling","elevationGain":10},
            {"id":"9999999999999","coords":[3,3],"distance":1,"duration":10,"type":"running","cadence":0}
        ]"#;
        store.backend_mut().set("workouts", raw).unwrap();

        let workouts = store.load();
        assert_eq!(workouts.len(), 3);
        assert_eq!(workouts[0].id(), "1234567890");
        assert_eq!(workouts[0].coords(), Coords::new(1.0, 1.0));
        assert_ne!(workouts[1].id(), "1234567890");
        assert_eq!(workouts[1].coords(), Coords::new(2.0, 2.0));
        // A stored id without a date still counts as taken.
        assert_eq!(workouts[2].id(), "9999999999999");
        assert!(workouts[1].id().parse::<i64>().unwrap() > 9_999_999_999_999);

        let fresh = Workout::running(Coords::new(0.0, 0.0), 1.0, 1.0, 0.0);
        assert!(workouts.iter().all(|w| w.id() != fresh.id()));
    }

    #[test]
    fn custom_key_is_used() {
        let mut store = WorkoutStore::with_key(SqliteStore::open_in_memory().unwrap(), "alt");
        store
            .save(&[Workout::running(Coords::new(0.0, 0.0), 1.0, 5.0, 0.0)])
            .unwrap();
        assert!(store.backend().get("workouts").unwrap().is_none());
        assert_eq!(store.load().len(), 1);
        store.clear().unwrap();
        assert!(store.load().is_empty());
    }
}
