// mapty-tui/src/main.rs
use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use mapty_lib::HtmlList;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{fs::File, io, sync::Mutex, time::Duration};
use tracing_subscriber::EnvFilter;

mod app; // Application state
mod ui; // UI rendering logic

use crate::app::{App, CanvasMap, Core};

// The terminal belongs to the UI, so logs go to a file next to the database.
fn init_logging() -> Result<()> {
    let dir = dirs::data_dir()
        .context("Could not determine data directory")?
        .join("mapty");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {dir:?}"))?;
    let file = File::create(dir.join("mapty-tui.log"))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,mapty_tui=info,mapty_lib=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    init_logging()?;

    // Initialize the library app before touching the terminal
    let core = Core::initialize(CanvasMap::new(), HtmlList::new())
        .context("Failed to initialize application")?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and run it
    let mut app = App::new(core);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "tui exited with an error");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.clear_expired_error();

        terminal.draw(|f| ui::render_ui(f, app))?;

        // A short poll keeps animated pans smooth
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key_event(key)?;
                }
                Event::Mouse(mouse) => app.handle_mouse_event(mouse),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
