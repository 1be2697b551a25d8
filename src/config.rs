//src/config.rs
use crate::workout::{Coords, WorkoutType};
use comfy_table::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_CONFIG_DIR: &str = "mapty";
const CONFIG_ENV_VAR: &str = "MAPTY_CONFIG_DIR"; // Environment variable name

pub const DEFAULT_MAP_ZOOM: u8 = 13;
pub const MAX_MAP_ZOOM: u8 = 18;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not determine configuration directory.")]
    CannotDetermineConfigDir,
    #[error("I/O error accessing config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file (TOML): {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to serialize config data (TOML): {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Invalid color name: {0}")]
    InvalidColor(String),
    #[error("Invalid home location: {0}")]
    InvalidHome(String),
    #[error("Map zoom must be between 0 and 18 (got {0}).")]
    InvalidZoom(u8),
}

// Define standard colors using strum for easy iteration/parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum StandardColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    DarkGrey,
    DarkRed,
    DarkGreen,
    DarkYellow,
    DarkBlue,
    DarkMagenta,
    DarkCyan,
    Grey,
}

// Helper to convert our enum to comfy_table::Color
impl From<StandardColor> for Color {
    fn from(value: StandardColor) -> Self {
        match value {
            StandardColor::Black => Self::Black,
            StandardColor::Red => Self::Red,
            StandardColor::Green => Self::Green,
            StandardColor::Yellow => Self::Yellow,
            StandardColor::Blue => Self::Blue,
            StandardColor::Magenta => Self::Magenta,
            StandardColor::Cyan => Self::Cyan,
            StandardColor::White => Self::White,
            StandardColor::DarkGrey => Self::DarkGrey,
            StandardColor::DarkRed => Self::DarkRed,
            StandardColor::DarkGreen => Self::DarkGreen,
            StandardColor::DarkYellow => Self::DarkYellow,
            StandardColor::DarkBlue => Self::DarkBlue,
            StandardColor::DarkMagenta => Self::DarkMagenta,
            StandardColor::DarkCyan => Self::DarkCyan,
            StandardColor::Grey => Self::Grey,
        }
    }
}

// Helper to parse a string into our StandardColor enum
pub fn parse_color(color_str: &str) -> Result<StandardColor, Error> {
    StandardColor::iter()
        .find(|color| format!("{color:?}").eq_ignore_ascii_case(color_str.trim()))
        .ok_or_else(|| Error::InvalidColor(color_str.to_string()))
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)] // Ensure defaults are used if fields are missing
pub struct Theme {
    pub header_color: String,
    pub running_color: String,
    pub cycling_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            header_color: "Cyan".to_string(),
            running_color: "Green".to_string(),
            cycling_color: "Yellow".to_string(),
        }
    }
}

impl Theme {
    /// Color for a workout type. Falls back to white on an unknown name.
    pub fn color_for(&self, workout_type: WorkoutType) -> StandardColor {
        let name = match workout_type {
            WorkoutType::Running => &self.running_color,
            WorkoutType::Cycling => &self.cycling_color,
        };
        parse_color(name).unwrap_or(StandardColor::White)
    }

    pub fn header(&self) -> StandardColor {
        parse_color(&self.header_color).unwrap_or(StandardColor::White)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Home {
    pub lat: f64,
    pub lng: f64,
}

impl From<Home> for Coords {
    fn from(home: Home) -> Self {
        Self::new(home.lat, home.lng)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)] // Ensure defaults are used if fields are missing
pub struct Config {
    pub map_zoom: u8,
    /// Name of the storage slot holding the workout list.
    pub storage_key: String,
    /// Where the map starts when no live position is available.
    pub home: Option<Home>,
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map_zoom: DEFAULT_MAP_ZOOM,
            storage_key: crate::storage::DEFAULT_STORAGE_KEY.to_string(),
            home: None,
            theme: Theme::default(),
        }
    }
}

impl Config {
    pub fn home_coords(&self) -> Option<Coords> {
        self.home.map(Coords::from)
    }

    /// Sets the home location after checking the coordinates.
    pub fn set_home(&mut self, coords: Coords) -> Result<(), Error> {
        if !coords.is_valid() {
            return Err(Error::InvalidHome(coords.to_string()));
        }
        self.home = Some(Home {
            lat: coords.lat,
            lng: coords.lng,
        });
        Ok(())
    }

    pub fn set_map_zoom(&mut self, zoom: u8) -> Result<(), Error> {
        if zoom > MAX_MAP_ZOOM {
            return Err(Error::InvalidZoom(zoom));
        }
        self.map_zoom = zoom;
        Ok(())
    }
}

/// Determines the path to the configuration file.
/// Exposed at crate root as get_config_path_util
pub fn get_config_path() -> Result<PathBuf, Error> {
    let config_dir_override = std::env::var(CONFIG_ENV_VAR).ok();

    let config_dir_path = if let Some(path_str) = config_dir_override {
        let path = PathBuf::from(path_str);
        if !path.is_dir() {
            tracing::warn!(
                var = CONFIG_ENV_VAR,
                path = %path.display(),
                "config dir override is not a directory, trying to create it"
            );
            fs::create_dir_all(&path)?;
        }
        path
    } else {
        let base_config_dir = dirs::config_dir().ok_or(Error::CannotDetermineConfigDir)?;
        base_config_dir.join(APP_CONFIG_DIR)
    };

    if !config_dir_path.exists() {
        fs::create_dir_all(&config_dir_path)?;
    }

    Ok(config_dir_path.join(CONFIG_FILE_NAME))
}

/// Loads the configuration from the TOML file at the given path.
/// Writes a default file first if none exists.
pub fn load(config_path: &Path) -> Result<Config, Error> {
    if config_path.exists() {
        let config_content = fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&config_content)?;
        if config.map_zoom > MAX_MAP_ZOOM {
            return Err(Error::InvalidZoom(config.map_zoom));
        }
        Ok(config)
    } else {
        let default_config = Config::default();
        save(config_path, &default_config)?;
        Ok(default_config)
    }
}

/// Saves the configuration to the TOML file.
pub fn save(config_path: &Path, config: &Config) -> Result<(), Error> {
    if let Some(parent_dir) = config_path.parent() {
        if !parent_dir.exists() {
            fs::create_dir_all(parent_dir)?;
        }
    }
    let config_content = toml::to_string_pretty(config)?;
    fs::write(config_path, config_content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("mapty-config-test-{}-{name}", std::process::id()))
            .join(CONFIG_FILE_NAME)
    }

    #[test]
    fn load_creates_default_file() {
        let path = temp_config_path("default");
        let _ = fs::remove_file(&path);
        let config = load(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn round_trips_through_toml() {
        let path = temp_config_path("roundtrip");
        let mut config = Config::default();
        config.set_home(Coords::new(48.85, 2.35)).unwrap();
        config.set_map_zoom(10).unwrap();
        config.theme.running_color = "blue".into();
        save(&path, &config).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.home_coords(), Some(Coords::new(48.85, 2.35)));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: Config = toml::from_str("map_zoom = 9\n").unwrap();
        assert_eq!(config.map_zoom, 9);
        assert_eq!(config.storage_key, "workouts");
        assert!(config.home.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = Config::default();
        assert!(matches!(config.set_home(Coords::new(120.0, 0.0)), Err(Error::InvalidHome(_))));
        assert!(matches!(config.set_map_zoom(30), Err(Error::InvalidZoom(30))));
        assert!(matches!(parse_color("chartreuse"), Err(Error::InvalidColor(_))));
    }

    #[test]
    fn theme_colors_resolve() {
        let theme = Theme::default();
        assert_eq!(theme.color_for(WorkoutType::Running), StandardColor::Green);
        assert_eq!(parse_color("darkgrey").unwrap(), StandardColor::DarkGrey);
        let broken = Theme {
            cycling_color: "nope".into(),
            ..Theme::default()
        };
        assert_eq!(broken.color_for(WorkoutType::Cycling), StandardColor::White);
    }
}
