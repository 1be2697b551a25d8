use anyhow::Result;
use mapty_lib::{
    App, Config, ConfiguredLocation, Coords, Error, FixedLocation, FormField, GeolocationError,
    GeolocationProvider, HtmlList, KeyValueStore, MarkerStyle, RecordingMap, SqliteStore,
    ValidationError, WorkoutStore, WorkoutType, HOME_POPUP,
};

type TestApp = App<SqliteStore, RecordingMap, HtmlList>;

const HOME: Coords = Coords::new(38.7223, -9.1393);

// Helper function to create a test app with an in-memory store
fn create_test_app() -> Result<TestApp> {
    let store = WorkoutStore::new(SqliteStore::open_in_memory()?);
    Ok(App::new(
        Config::default(),
        store,
        RecordingMap::new(),
        HtmlList::new(),
    ))
}

fn started_app() -> Result<TestApp> {
    let mut app = create_test_app()?;
    app.start(&FixedLocation(HOME));
    Ok(app)
}

// Clicks the map, fills the form and submits it.
fn log_workout(
    app: &mut TestApp,
    workout_type: WorkoutType,
    at: Coords,
    distance: &str,
    duration: &str,
    secondary: &str,
) -> Result<String, Error> {
    app.handle_map_click(at);
    if app.form().workout_type() != workout_type {
        app.handle_variant_change();
    }
    let form = app.form_mut();
    form.set_input(FormField::Distance, distance);
    form.set_input(FormField::Duration, duration);
    let secondary_field = form.secondary_field();
    form.set_input(secondary_field, secondary);
    app.handle_submit().map(|w| w.id().to_string())
}

// Simulates restarting the app on top of the same storage.
fn restart(app: TestApp, geo: &dyn GeolocationProvider) -> TestApp {
    let config = app.config.clone();
    let store = app.into_store();
    let mut fresh = App::new(config, store, RecordingMap::new(), HtmlList::new());
    fresh.start(geo);
    fresh
}

#[test]
fn test_start_with_location_shows_home_marker() -> Result<()> {
    let app = started_app()?;
    assert!(app.is_map_ready());
    assert_eq!(app.map().view, Some((HOME, 13)));
    assert_eq!(app.map().markers.len(), 1);
    assert_eq!(app.map().markers[0].popup, HOME_POPUP);
    assert_eq!(app.map().markers[0].style, MarkerStyle::Home);
    assert!(app.workouts().is_empty());
    Ok(())
}

#[test]
fn test_start_without_location_keeps_list_usable() -> Result<()> {
    let mut app = started_app()?;
    log_workout(&mut app, WorkoutType::Running, HOME, "5", "30", "170")?;

    let app = restart(app, &ConfiguredLocation::new(None));
    assert!(!app.is_map_ready());
    assert_eq!(app.workouts().len(), 1);
    assert_eq!(app.list().len(), 1);
    assert!(app.map().markers.is_empty());
    Ok(())
}

#[test]
fn test_geolocation_failure_is_not_fatal() -> Result<()> {
    struct Denied;
    impl GeolocationProvider for Denied {
        fn current_position(&self) -> Result<Coords, GeolocationError> {
            Err(GeolocationError::Denied)
        }
    }

    let mut app = create_test_app()?;
    assert_eq!(app.start(&Denied), None);
    // Clicks are ignored while there is no map.
    app.handle_map_click(HOME);
    assert!(!app.form().is_visible());
    Ok(())
}

#[test]
fn test_submit_records_renders_and_persists() -> Result<()> {
    let mut app = started_app()?;
    let spot = Coords::new(38.73, -9.15);
    let id = log_workout(&mut app, WorkoutType::Running, spot, "5", "30", "80")?;

    let workout = app.workout(&id).expect("workout should be recorded");
    assert_eq!(workout.pace(), Some(10.0));
    assert_eq!(workout.cadence(), Some(80.0));
    assert_eq!(workout.coords(), spot);

    // Home marker + the new one.
    assert_eq!(app.map().markers.len(), 2);
    assert_eq!(
        app.map().markers[1].style,
        MarkerStyle::Workout(WorkoutType::Running)
    );
    assert!(app.map().markers[1].popup.starts_with("Running "));

    assert_eq!(app.list().len(), 1);
    assert_eq!(app.list().id_at(0), Some(id.as_str()));

    // Form is hidden and cleared.
    assert!(!app.form().is_visible());
    assert_eq!(app.form().input(FormField::Distance), "");

    assert_eq!(app.store().load().len(), 1);
    Ok(())
}

#[test]
fn test_cycling_speed() -> Result<()> {
    let mut app = started_app()?;
    let id = log_workout(&mut app, WorkoutType::Cycling, HOME, "20", "60", "150")?;
    let workout = app.workout(&id).unwrap();
    assert_eq!(workout.speed(), Some(20.0));
    assert_eq!(workout.elevation_gain(), Some(150.0));
    Ok(())
}

#[test]
fn test_invalid_submission_changes_nothing() -> Result<()> {
    let mut app = started_app()?;

    for distance in ["0", "-2"] {
        let err = log_workout(&mut app, WorkoutType::Running, HOME, distance, "30", "80")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::NotPositive { field: FormField::Distance, .. })
        ));
    }

    let err = log_workout(&mut app, WorkoutType::Cycling, HOME, "12", "abc", "10").unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::NotANumber { field: FormField::Duration, .. })
    ));

    assert!(app.workouts().is_empty());
    assert!(app.list().is_empty());
    assert_eq!(app.map().markers.len(), 1);
    assert!(app.store().load().is_empty());
    // Input is kept for correction.
    assert!(app.form().is_visible());
    assert_eq!(app.form().input(FormField::Duration), "abc");
    Ok(())
}

#[test]
fn test_storage_round_trip_across_restart() -> Result<()> {
    let mut app = started_app()?;
    log_workout(&mut app, WorkoutType::Running, Coords::new(1.0, 2.0), "5", "30", "80")?;
    log_workout(&mut app, WorkoutType::Cycling, Coords::new(3.0, 4.0), "27", "95", "523")?;
    log_workout(&mut app, WorkoutType::Running, Coords::new(5.0, 6.0), "2.5", "12", "-1")?;

    let before: Vec<_> = app
        .workouts()
        .iter()
        .map(|w| (w.id().to_string(), w.workout_type(), w.coords(), w.distance(), w.duration(), w.secondary_value()))
        .collect();
    let html_before: Vec<String> = app.list().entries().iter().map(|e| e.to_string()).collect();

    let app = restart(app, &FixedLocation(HOME));
    let after: Vec<_> = app
        .workouts()
        .iter()
        .map(|w| (w.id().to_string(), w.workout_type(), w.coords(), w.distance(), w.duration(), w.secondary_value()))
        .collect();
    let html_after: Vec<String> = app.list().entries().iter().map(|e| e.to_string()).collect();

    assert_eq!(before, after);
    assert_eq!(html_before, html_after);
    // Home + three restored markers.
    assert_eq!(app.map().markers.len(), 4);
    Ok(())
}

#[test]
fn test_list_order_and_click_resolution() -> Result<()> {
    let mut app = started_app()?;
    let mut ids = Vec::new();
    for i in 0_u8..6 {
        let at = Coords::new(10.0 + f64::from(i), 20.0);
        let kind = if i % 2 == 0 { WorkoutType::Running } else { WorkoutType::Cycling };
        ids.push(log_workout(&mut app, kind, at, "3", "20", "100")?);
    }

    assert_eq!(app.list().len(), ids.len());
    for (k, id) in ids.iter().enumerate() {
        let clicked = app.list().id_at(k).unwrap().to_string();
        assert_eq!(&clicked, id);
        assert!(app.center_on_workout(&clicked));
        let expected = app.workouts()[k].coords();
        assert_eq!(app.map().moves.last(), Some(&(expected, 13, true)));
    }
    Ok(())
}

#[test]
fn test_center_on_unknown_id_is_noop() -> Result<()> {
    let mut app = started_app()?;
    log_workout(&mut app, WorkoutType::Running, HOME, "5", "30", "80")?;
    assert!(!app.center_on_workout("does-not-exist"));
    assert!(app.map().moves.is_empty());
    Ok(())
}

#[test]
fn test_reset_clears_everything() -> Result<()> {
    let mut app = started_app()?;
    log_workout(&mut app, WorkoutType::Running, HOME, "5", "30", "80")?;
    log_workout(&mut app, WorkoutType::Cycling, HOME, "15", "45", "80")?;

    let centered = app.reset(&FixedLocation(HOME))?;
    assert_eq!(centered, Some(HOME));
    assert!(app.workouts().is_empty());
    assert!(app.list().is_empty());
    assert_eq!(app.map().markers.len(), 1);
    assert!(app.store().load().is_empty());
    assert!(app.store().backend().get("workouts")?.is_none());
    Ok(())
}

#[test]
fn test_corrupted_storage_starts_empty() -> Result<()> {
    let mut backend = SqliteStore::open_in_memory()?;
    backend.set("workouts", "[{\"type\":\"running\", \"coords\": \"oops\"}]")?;
    let mut app = App::new(
        Config::default(),
        WorkoutStore::new(backend),
        RecordingMap::new(),
        HtmlList::new(),
    );
    app.start(&FixedLocation(HOME));
    assert!(app.workouts().is_empty());

    // The app stays usable and overwrites the bad snapshot.
    log_workout(&mut app, WorkoutType::Running, HOME, "5", "30", "80")?;
    assert_eq!(app.store().load().len(), 1);
    Ok(())
}

#[test]
fn test_configured_zoom_is_used() -> Result<()> {
    let mut config = Config::default();
    config.set_map_zoom(9)?;
    config.set_home(HOME)?;
    let mut app = App::new(
        config.clone(),
        WorkoutStore::new(SqliteStore::open_in_memory()?),
        RecordingMap::new(),
        HtmlList::new(),
    );
    app.start(&ConfiguredLocation::new(config.home_coords()));
    assert_eq!(app.map().view, Some((HOME, 9)));
    Ok(())
}

#[test]
fn test_duplicate_stored_ids_resolve_to_their_own_entry() -> Result<()> {
    let mut backend = SqliteStore::open_in_memory()?;
    backend.set(
        "workouts",
        r#"[
            {"id":"1234567890","coords":[1,1],"distance":5,"duration":30,"type":"running","cadence":170},
            {"id":"1234567890","coords":[2,2],"distance":20,"duration":60,"type":"cycling","elevationGain":10}
        ]"#,
    )?;
    let mut app = App::new(
        Config::default(),
        WorkoutStore::new(backend),
        RecordingMap::new(),
        HtmlList::new(),
    );
    app.start(&FixedLocation(HOME));

    assert_eq!(app.list().len(), 2);
    assert_ne!(app.list().id_at(0), app.list().id_at(1));
    for (k, expected) in [Coords::new(1.0, 1.0), Coords::new(2.0, 2.0)].into_iter().enumerate() {
        let id = app.list().id_at(k).unwrap().to_string();
        assert!(app.center_on_workout(&id));
        assert_eq!(app.map().moves.last(), Some(&(expected, 13, true)));
    }
    Ok(())
}
