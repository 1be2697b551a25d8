//src/main.rs
mod cli; // Keep cli module for parsing args

use anyhow::{bail, Context, Result};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use mapty_lib::{
    App, ConfiguredLocation, Coords, FixedLocation, FormField, HtmlList, RecordingMap,
    SqliteStore, Theme, Workout, WorkoutType,
};
use std::io::{stdin, stdout, Write};
use tracing_subscriber::{fmt, EnvFilter};

type CliApp = App<SqliteStore, RecordingMap, HtmlList>;

/// Default level is WARN so command output stays clean.
/// - `-v` => INFO
/// - `-vv` => DEBUG
/// - `-vvv` => TRACE
/// - `-q` => ERROR
///
/// `RUST_LOG` overrides everything.
fn init_logging(verbose: u8, quiet: u8) {
    let net = i16::from(verbose) - i16::from(quiet);
    let level = match net {
        i16::MIN..=-1 => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,mapty={level},mapty_lib={level}")));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::ChronoLocal::rfc_3339())
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli_args = cli::parse_args();
    init_logging(cli_args.verbose, cli_args.quiet);

    if let cli::Commands::Completion { shell } = cli_args.command {
        let mut cmd = cli::build_cli_command();
        let bin_name = cmd.get_name().to_string();
        eprintln!("Generating completion script for {shell}...");
        clap_complete::generate(shell, &mut cmd, bin_name, &mut stdout());
        return Ok(());
    }

    let mut app = CliApp::initialize(RecordingMap::new(), HtmlList::new())
        .context("Failed to initialize application")?;

    match cli_args.command {
        cli::Commands::Completion { .. } => {
            unreachable!("Completion generation should have exited already")
        }
        cli::Commands::Add {
            type_,
            at,
            distance,
            duration,
            cadence,
            elevation,
        } => {
            let workout_type = WorkoutType::from(type_);
            let secondary = match workout_type {
                WorkoutType::Running if elevation.is_some() => {
                    bail!("--elevation only applies to cycling workouts")
                }
                WorkoutType::Cycling if cadence.is_some() => {
                    bail!("--cadence only applies to running workouts")
                }
                WorkoutType::Running => cadence,
                WorkoutType::Cycling => elevation,
            };

            // The map opens on home when known, otherwise on the clicked spot.
            let center = app.config.home_coords().unwrap_or(at);
            app.start(&FixedLocation(center));
            app.handle_map_click(at);
            let form = app.form_mut();
            form.set_workout_type(workout_type);
            form.set_input(FormField::Distance, distance);
            form.set_input(FormField::Duration, duration);
            let secondary_field = form.secondary_field();
            form.set_input(secondary_field, secondary.unwrap_or_default());

            match app.handle_submit() {
                Ok(workout) => println!(
                    "Logged {} at {} (ID: {})",
                    workout.description(),
                    workout.coords(),
                    workout.id()
                ),
                Err(e) => bail!("Error adding workout: {e}"),
            }
        }
        cli::Commands::List { html } => {
            app.start(&ConfiguredLocation::new(app.config.home_coords()));
            if html {
                print!("{}", app.list().to_html());
            } else if app.workouts().is_empty() {
                println!("No workouts logged yet.");
            } else {
                print_workout_table(app.workouts(), &app.config.theme);
            }
        }
        cli::Commands::Center { id } => {
            if app.start(&ConfiguredLocation::new(app.config.home_coords())).is_none() {
                bail!("No home location set, so there is no map to move. Use 'set-home <lat> <lng>' first.");
            }
            if app.center_on_workout(&id) {
                if let Some((coords, zoom)) = app.map().view {
                    println!("Map centered on {coords} (zoom {zoom}).");
                }
            } else {
                println!("No workout with ID {id}.");
            }
        }
        cli::Commands::Reset { yes } => {
            if !yes && !confirm("Delete every logged workout? [y/N]: ")? {
                println!("Nothing deleted.");
                return Ok(());
            }
            let geo = ConfiguredLocation::new(app.config.home_coords());
            app.start(&geo);
            let count = app.workouts().len();
            app.reset(&geo).context("Failed to reset workouts")?;
            println!("Deleted {count} workout(s).");
        }
        cli::Commands::SetHome { lat, lng } => {
            let coords = Coords::new(lat, lng);
            app.config.set_home(coords)?;
            app.save_config()?;
            println!("Home location set to {coords}.");
        }
        cli::Commands::ClearHome => {
            app.config.home = None;
            app.save_config()?;
            println!("Home location cleared.");
        }
        cli::Commands::Paths => {
            println!("Config file: {}", app.get_config_path().display());
            println!("Database: {}", app.db_path.display());
        }
    }

    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    stdout().flush()?;
    let mut input = String::new();
    stdin().read_line(&mut input)?;
    Ok(matches!(input.trim(), "y" | "Y" | "yes" | "Yes"))
}

fn print_workout_table(workouts: &[Workout], theme: &Theme) {
    let header_color: Color = theme.header().into();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            [
                "ID", "Workout", "Location", "Distance", "Duration", "Pace/Speed", "Cadence/Elev",
            ]
            .into_iter()
            .map(|h| Cell::new(h).fg(header_color).add_attribute(Attribute::Bold)),
        );

    for w in workouts {
        let derived = w.derived_metric();
        let secondary = w.secondary_metric();
        let type_color: Color = theme.color_for(w.workout_type()).into();
        table.add_row(vec![
            Cell::new(w.id()),
            Cell::new(w.description()).fg(type_color),
            Cell::new(w.coords()),
            Cell::new(format!("{} km", w.distance())),
            Cell::new(format!("{} min", w.duration())),
            Cell::new(format!("{:.1} {}", derived.value, derived.unit)),
            Cell::new(format!("{:.1} {}", secondary.value, secondary.unit)),
        ]);
    }
    println!("{table}");
}
