//! Core session client components.
//!
//! - **transcript**: Append-only transcript model
//! - **input**: Command line buffer
//! - **state**: Immutable client state snapshot and its transitions
//! - **session**: Performs requested effects against a backend
//!
//! # Architecture
//!
//! ```text
//! ClientState ──transition──▶ (ClientState, Effect)
//!      ▲                              │
//!      └──────settle(Outcome)◀──perform(backend)
//! ```

pub mod input;
pub mod session;
pub mod state;
pub mod transcript;

pub use input::InputEdit;
pub use session::{perform, SessionDriver};
pub use state::{ClientState, Effect, Outcome, Phase, SessionSettings};
pub use transcript::{EntryKind, TranscriptEntry};
