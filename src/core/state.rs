//! Client state and its transitions.
//!
//! [`ClientState`] is an immutable snapshot. Every operation consumes the
//! current snapshot and returns the next one, together with the [`Effect`]
//! (network request) the caller must perform. The result of that request is
//! fed back through [`ClientState::settle`].
//!
//! ```text
//! Uninitialized ──start ok──▶ Ready ◀──settle── Busy
//!       │                       │                 ▲
//!   start failed                └────submit───────┘
//!       ▼
//!     Failed
//! ```

use tracing::{error, info, warn};

use crate::api::{
    resolve_image_url, ApiError, CommandResponse, GameState, NewGameResponse, SessionId,
};

use super::input::{InputBuffer, InputEdit};
use super::transcript::{Transcript, TranscriptEntry};

/// Prompt marker echoed in front of submitted commands
pub const PROMPT: &str = "> ";
pub const BANNER: &str = "=== ZAIK ===";
pub const SUBTITLE: &str = "An AI-Powered Text Adventure";
pub const START_FAILED: &str = "Failed to start the game. Restart the client to try again.";
pub const COMMAND_FAILED: &str = "Error: failed to process command.";

/// Fixed values the session operations need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Backend base address, used to resolve image references
    pub base_url: String,
    /// Adventure every new session is started with
    pub adventure_id: String,
    pub player_name: Option<String>,
}

/// The active game session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub session_id: SessionId,
}

/// Where the player is, from the last state the backend reported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationStatus {
    pub location_id: Option<String>,
    pub inventory: Vec<String>,
    pub visited: Vec<String>,
}

/// Session lifecycle phase (derived from state, never stored)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Ready,
    Busy,
    Failed,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Uninitialized => "Starting",
            Phase::Ready => "Ready",
            Phase::Busy => "Busy",
            Phase::Failed => "Failed",
        }
    }
}

/// Kind of request currently in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingRequest {
    Start,
    Command,
}

/// A network request a transition asks the caller to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Create a session, discarding `discard` on the backend first
    StartSession {
        adventure_id: String,
        player_name: Option<String>,
        discard: Option<SessionId>,
    },
    SendCommand {
        session_id: SessionId,
        command: String,
    },
}

/// How a performed [`Effect`] settled
#[derive(Debug)]
pub enum Outcome {
    Started(Result<NewGameResponse, ApiError>),
    Command(Result<CommandResponse, ApiError>),
}

/// Complete client state snapshot
#[derive(Debug, Clone, Default)]
pub struct ClientState {
    transcript: Transcript,
    session: Option<SessionHandle>,
    pending: Option<PendingRequest>,
    input: InputBuffer,
    input_focused: bool,
    started: bool,
    failed: bool,
    location: LocationStatus,
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn session(&self) -> Option<&SessionHandle> {
        self.session.as_ref()
    }

    /// The pending-request flag
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    /// Whether the cursor belongs on the command input
    pub fn input_focused(&self) -> bool {
        self.input_focused && self.accepts_input()
    }

    pub fn location(&self) -> &LocationStatus {
        &self.location
    }

    pub fn phase(&self) -> Phase {
        if self.failed {
            Phase::Failed
        } else if self.session.is_none() {
            Phase::Uninitialized
        } else if self.pending.is_some() {
            Phase::Busy
        } else {
            Phase::Ready
        }
    }

    /// Input is only accepted in `Ready`
    pub fn accepts_input(&self) -> bool {
        self.phase() == Phase::Ready
    }

    /// Request the first session. Runs at most once per state lifetime.
    pub fn begin_start(mut self, settings: &SessionSettings) -> (Self, Option<Effect>) {
        if self.started || self.pending.is_some() || self.session.is_some() {
            return (self, None);
        }
        self.started = true;
        self.pending = Some(PendingRequest::Start);
        info!("Starting session for adventure '{}'", settings.adventure_id);
        let effect = Effect::StartSession {
            adventure_id: settings.adventure_id.clone(),
            player_name: settings.player_name.clone(),
            discard: None,
        };
        (self, Some(effect))
    }

    /// Abandon the current session and start a fresh one (only in `Ready`)
    pub fn new_game(mut self, settings: &SessionSettings) -> (Self, Option<Effect>) {
        if !self.accepts_input() {
            return (self, None);
        }
        let old = self.session.take().map(|h| h.session_id);
        info!("New game requested (discarding {:?})", old.as_ref().map(|s| s.as_str()));
        self.transcript.push(TranscriptEntry::blank());
        self.pending = Some(PendingRequest::Start);
        self.input_focused = false;
        let effect = Effect::StartSession {
            adventure_id: settings.adventure_id.clone(),
            player_name: settings.player_name.clone(),
            discard: old,
        };
        (self, Some(effect))
    }

    /// Echo a command line and request it be sent.
    ///
    /// A missing session, a pending request, or a blank line makes this a
    /// no-op: nothing is echoed, the input is left alone, no effect.
    pub fn submit(mut self, line: &str) -> (Self, Option<Effect>) {
        if !self.accepts_input() || line.trim().is_empty() {
            return (self, None);
        }
        let Some(handle) = self.session.as_ref() else {
            return (self, None);
        };
        let session_id = handle.session_id.clone();

        self.transcript.push(TranscriptEntry::input_echo(PROMPT, line));
        self.input.apply(InputEdit::Clear);
        self.input_focused = false;
        self.pending = Some(PendingRequest::Command);

        let effect = Effect::SendCommand {
            session_id,
            command: line.to_string(),
        };
        (self, Some(effect))
    }

    /// Submit whatever is in the input buffer
    pub fn submit_input(self) -> (Self, Option<Effect>) {
        let line = self.input.text().to_string();
        self.submit(&line)
    }

    /// Apply an edit to the input buffer. Ignored unless input is accepted.
    pub fn with_input(mut self, edit: InputEdit) -> Self {
        if self.accepts_input() {
            self.input.apply(edit);
        }
        self
    }

    /// Second half of both operations: apply the settled request.
    ///
    /// The pending flag is cleared whichever way the request went.
    pub fn settle(mut self, outcome: Outcome, settings: &SessionSettings) -> Self {
        match (self.pending, outcome) {
            (Some(PendingRequest::Start), Outcome::Started(result)) => {
                self.pending = None;
                match result {
                    Ok(response) => self.apply_started(response, settings),
                    Err(e) => {
                        error!("Failed to start game: {}", e);
                        self.failed = true;
                        self.input_focused = false;
                        self.transcript.push(TranscriptEntry::error(START_FAILED));
                    }
                }
            }
            (Some(PendingRequest::Command), Outcome::Command(result)) => {
                self.pending = None;
                match result {
                    Ok(response) => self.apply_command(response, settings),
                    Err(e) => {
                        if e.is_timeout() {
                            error!("Command timed out: {}", e);
                        } else {
                            error!("Failed to process command: {}", e);
                        }
                        self.transcript.push(TranscriptEntry::error(COMMAND_FAILED));
                    }
                }
                self.input_focused = true;
            }
            (pending, outcome) => {
                warn!("Ignoring outcome {:?} (pending: {:?})", outcome, pending);
            }
        }
        self
    }

    fn apply_started(&mut self, response: NewGameResponse, settings: &SessionSettings) {
        info!("Session {} started", response.session_id);
        self.session = Some(SessionHandle {
            session_id: response.session_id,
        });
        self.location = LocationStatus {
            location_id: response.current_location_id,
            inventory: response.inventory,
            visited: response.visited_locations,
        };

        self.transcript.push(TranscriptEntry::output(BANNER));
        self.transcript.push(TranscriptEntry::output(SUBTITLE));
        self.transcript.push(TranscriptEntry::blank());
        if let Some(url) = response.image_url.as_deref() {
            self.push_image(settings, url);
        }
        self.transcript.push(TranscriptEntry::output(response.message));
        self.input_focused = true;
    }

    fn apply_command(&mut self, response: CommandResponse, settings: &SessionSettings) {
        if !response.success {
            warn!("Backend reported an unsuccessful command");
        }
        self.transcript.push(TranscriptEntry::blank());
        if let Some(url) = response.state.image_url.as_deref() {
            self.push_image(settings, url);
        }
        self.transcript.push(TranscriptEntry::output(response.message));
        self.update_location(response.state);
    }

    fn push_image(&mut self, settings: &SessionSettings, url: &str) {
        self.transcript
            .push(TranscriptEntry::image(resolve_image_url(&settings.base_url, url)));
    }

    fn update_location(&mut self, state: GameState) {
        if state.current_location_id.is_some() {
            self.location.location_id = state.current_location_id;
        }
        self.location.inventory = state.inventory;
        self.location.visited = state.visited_locations;
    }
}
