// src/cli.rs
use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use mapty_lib::{Coords, WorkoutType};

#[derive(Parser, Debug)]
#[command(author, version, about = "Log running and cycling workouts on a map", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v, -vv). Defaults to WARN.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q).
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkoutTypeCli {
    Running,
    Cycling,
}

impl From<WorkoutTypeCli> for WorkoutType {
    fn from(value: WorkoutTypeCli) -> Self {
        match value {
            WorkoutTypeCli::Running => Self::Running,
            WorkoutTypeCli::Cycling => Self::Cycling,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log a workout at a map location
    Add {
        /// Kind of workout
        #[arg(short = 't', long = "type", value_enum, default_value = "running")]
        type_: WorkoutTypeCli,
        /// Location as "lat,lng" (e.g. "38.72,-9.14")
        #[arg(short, long, value_parser = parse_coords, allow_hyphen_values = true)]
        at: Coords,
        /// Distance in km
        #[arg(short, long, allow_hyphen_values = true)]
        distance: String,
        /// Duration in minutes
        #[arg(short = 'm', long, allow_hyphen_values = true)]
        duration: String,
        /// Cadence in steps per minute (running)
        #[arg(short, long, allow_hyphen_values = true, conflicts_with = "elevation")]
        cadence: Option<String>,
        /// Elevation gain in meters (cycling)
        #[arg(short, long, allow_hyphen_values = true)]
        elevation: Option<String>,
    },
    /// List logged workouts, oldest first
    List {
        /// Print the list entries as HTML instead of a table
        #[arg(long)]
        html: bool,
    },
    /// Center the map on a workout
    Center {
        /// Workout id, as shown by `list`
        id: String,
    },
    /// Delete every logged workout
    Reset {
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Set the location the map starts at
    SetHome {
        #[arg(allow_hyphen_values = true)]
        lat: f64,
        #[arg(allow_hyphen_values = true)]
        lng: f64,
    },
    /// Forget the home location
    ClearHome,
    /// Show the config and database paths
    Paths,
    /// Generate shell completion script
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parses "lat,lng".
pub fn parse_coords(raw: &str) -> Result<Coords, String> {
    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lng\", got '{raw}'"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude '{}': {e}", lat.trim()))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude '{}': {e}", lng.trim()))?;
    let coords = Coords::new(lat, lng);
    if coords.is_valid() {
        Ok(coords)
    } else {
        Err(format!("coordinates out of range: {coords}"))
    }
}

// Function to parse CLI arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
