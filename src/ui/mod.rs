//! Terminal user interface.
//!
//! - `loop_runner` - event loop, terminal setup, focus-driven lifecycle
//! - `input` - keyboard handling
//! - `render` - frame layout and overlays
//! - `articles` - the article list
//! - `status` - status bar
//! - `help` - keybinding overlay

mod articles;
mod help;
mod input;
mod loop_runner;
mod render;
mod status;

pub use loop_runner::{run, Action};
