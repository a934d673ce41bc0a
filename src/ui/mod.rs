//! User interface rendering and input handling.
//!
//! - **renderer**: Transcript layout, input line and status bar
//! - **keymapper**: Keyboard input to client actions

pub mod keymapper;
pub mod renderer;

pub use keymapper::{Action, KeyMapper};
pub use renderer::{Renderer, TranscriptView};
