// mapty-tui/src/app/input.rs
use super::state::{ActiveModal, App, Focus};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use mapty_lib::Error as MaptyError;
use ratatui::layout::Rect;

fn area_contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x && column < area.x + area.width && row >= area.y && row < area.y + area.height
}

// Main key event handler method on App
impl App {
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        // Handle based on active modal first
        if self.active_modal != ActiveModal::None {
            self.handle_modal_input(key);
            return Ok(());
        }

        // The open form takes every key it understands
        if self.core.form().is_visible() {
            self.handle_form_input(key);
            return Ok(());
        }

        // Global keys
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.active_modal = ActiveModal::Help,
            KeyCode::Char('R') => self.active_modal = ActiveModal::ConfirmReset,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Map => Focus::List,
                    Focus::List => Focus::Map,
                };
            }
            _ => match self.focus {
                Focus::Map => self.handle_map_input(key),
                Focus::List => self.handle_list_input(key),
            },
        }
        Ok(())
    }

    fn handle_modal_input(&mut self, key: KeyEvent) {
        match self.active_modal {
            ActiveModal::Help | ActiveModal::Alert(_) => {
                if matches!(
                    key.code,
                    KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter | KeyCode::Char('?')
                ) {
                    self.active_modal = ActiveModal::None;
                }
            }
            ActiveModal::ConfirmReset => match key.code {
                KeyCode::Char('y' | 'Y') => {
                    self.active_modal = ActiveModal::None;
                    self.reset();
                }
                KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                    self.active_modal = ActiveModal::None;
                }
                _ => {}
            },
            ActiveModal::None => {}
        }
    }

    fn handle_form_input(&mut self, key: KeyEvent) {
        let form = self.core.form_mut();
        match key.code {
            KeyCode::Esc => form.hide(),
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_previous(),
            KeyCode::Left | KeyCode::Right => self.core.handle_variant_change(),
            KeyCode::Backspace => form.pop_char(),
            KeyCode::Char(c) if c.is_ascii_digit() || matches!(c, '.' | '-' | 'e' | 'E') => {
                form.push_char(c);
            }
            KeyCode::Enter => self.submit_form(),
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        match self.core.handle_submit() {
            Ok(_) => self.select_last(),
            Err(MaptyError::Validation(e)) => {
                self.active_modal = ActiveModal::Alert(e.to_string());
            }
            Err(e @ MaptyError::Storage(_)) => {
                // The workout is kept in memory even though it was not saved.
                self.select_last();
                self.set_error(format!("Not saved: {e}"));
            }
        }
    }

    fn handle_map_input(&mut self, key: KeyEvent) {
        let area = self.map_area;
        let map = self.core.map_mut();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => map.pan_by(area, 1.0, 0.0),
            KeyCode::Down | KeyCode::Char('j') => map.pan_by(area, -1.0, 0.0),
            KeyCode::Left | KeyCode::Char('h') => map.pan_by(area, 0.0, -1.0),
            KeyCode::Right | KeyCode::Char('l') => map.pan_by(area, 0.0, 1.0),
            KeyCode::Char('+' | '=') => map.zoom_in(),
            KeyCode::Char('-') => map.zoom_out(),
            KeyCode::Enter => {
                // Clicks the middle of the map
                let column = area.x + area.width / 2;
                let row = area.y + area.height / 2;
                self.click_map(column, row);
            }
            _ => {}
        }
    }

    fn handle_list_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.list_next(),
            KeyCode::Up | KeyCode::Char('k') => self.list_previous(),
            KeyCode::Enter => {
                if let Some(i) = self.list_state.selected() {
                    self.select_entry(i);
                }
            }
            _ => {}
        }
    }

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        if self.active_modal != ActiveModal::None {
            return;
        }
        let (column, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if area_contains(self.map_area, column, row) {
                    self.focus = Focus::Map;
                    self.click_map(column, row);
                } else if area_contains(self.list_area, column, row) {
                    self.focus = Focus::List;
                    self.click_list(row);
                }
            }
            MouseEventKind::ScrollUp if area_contains(self.map_area, column, row) => {
                self.core.map_mut().zoom_in();
            }
            MouseEventKind::ScrollDown if area_contains(self.map_area, column, row) => {
                self.core.map_mut().zoom_out();
            }
            _ => {}
        }
    }

    fn click_map(&mut self, column: u16, row: u16) {
        let Some(coords) = self
            .core
            .map()
            .viewport(self.map_area)
            .and_then(|v| v.coords_at(self.map_area, column, row))
        else {
            return;
        };
        self.core.handle_map_click(coords);
    }

    // Each entry takes two rows inside the bordered list.
    fn click_list(&mut self, row: u16) {
        let inner_top = self.list_area.y + 1;
        if row < inner_top {
            return;
        }
        let index = usize::from((row - inner_top) / 2) + self.list_state.offset();
        if index < self.core.list().len() {
            self.select_entry(index);
        }
    }
}
