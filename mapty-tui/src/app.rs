// mapty-tui/src/app.rs
mod input;
pub mod map_view;
pub mod state;

pub use map_view::CanvasMap;
pub use state::{ActiveModal, App, Core, Focus};
