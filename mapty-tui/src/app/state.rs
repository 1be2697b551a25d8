// mapty-tui/src/app/state.rs
use super::map_view::CanvasMap;
use mapty_lib::{App as MaptyApp, ConfiguredLocation, HtmlList, SqliteStore};
use ratatui::{layout::Rect, widgets::ListState};
use std::time::{Duration, Instant};

pub type Core = MaptyApp<SqliteStore, CanvasMap, HtmlList>;

const ERROR_DISPLAY_TIME: Duration = Duration::from_secs(5);

// Which pane takes keyboard input when no form or modal is open
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Map,
    List,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActiveModal {
    None,
    Help,
    ConfirmReset,
    Alert(String),
}

// Holds the application state
pub struct App {
    pub core: Core,
    pub geo: ConfiguredLocation,
    pub should_quit: bool,
    pub focus: Focus,
    pub active_modal: ActiveModal,
    pub last_error: Option<String>, // For status bar errors
    pub error_clear_time: Option<Instant>,
    pub list_state: ListState,
    // Where the panes were last drawn, for mouse hit testing
    pub map_area: Rect,
    pub list_area: Rect,
}

impl App {
    pub fn new(mut core: Core) -> Self {
        let geo = ConfiguredLocation::new(core.config.home_coords());
        core.start(&geo);
        let mut list_state = ListState::default();
        if !core.list().is_empty() {
            list_state.select(Some(0));
        }
        Self {
            core,
            geo,
            should_quit: false,
            focus: Focus::Map,
            active_modal: ActiveModal::None,
            last_error: None,
            error_clear_time: None,
            list_state,
            map_area: Rect::default(),
            list_area: Rect::default(),
        }
    }

    pub fn set_error(&mut self, msg: String) {
        self.last_error = Some(msg);
        self.error_clear_time = Some(Instant::now() + ERROR_DISPLAY_TIME);
    }

    pub(crate) fn clear_expired_error(&mut self) {
        if let Some(clear_time) = self.error_clear_time {
            if Instant::now() >= clear_time {
                self.last_error = None;
                self.error_clear_time = None;
            }
        }
    }

    pub fn list_next(&mut self) {
        let len = self.core.list().len();
        if len == 0 {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| (i + 1) % len);
        self.list_state.select(Some(i));
    }

    pub fn list_previous(&mut self) {
        let len = self.core.list().len();
        if len == 0 {
            return;
        }
        let i = self
            .list_state
            .selected()
            .map_or(0, |i| if i == 0 { len - 1 } else { i - 1 });
        self.list_state.select(Some(i));
    }

    /// Centers the map on the list entry at `index`.
    pub fn select_entry(&mut self, index: usize) {
        let Some(id) = self.core.list().id_at(index).map(str::to_string) else {
            return;
        };
        self.list_state.select(Some(index));
        if !self.core.center_on_workout(&id) {
            self.set_error("No map to move".to_string());
        }
    }

    /// Keeps the selection pointing at the newest entry after a submit.
    pub(crate) fn select_last(&mut self) {
        let len = self.core.list().len();
        self.list_state.select(len.checked_sub(1));
    }

    pub fn reset(&mut self) {
        match self.core.reset(&self.geo) {
            Ok(_) => self.list_state.select(None),
            Err(e) => self.set_error(format!("Reset failed: {e}")),
        }
    }
}
