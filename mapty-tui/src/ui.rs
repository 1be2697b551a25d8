// mapty-tui/src/ui.rs
mod form;
mod layout;
mod list;
mod map;
mod modals;
mod status_bar;

// Re-export the main render function
pub use layout::render_ui;
