//! Session operations
//!
//! Executes the effects requested by [`ClientState`] transitions against a
//! [`GameBackend`], and drives the two session operations end to end.

use tracing::{debug, warn};

use crate::api::{CommandRequest, GameBackend, NewGameRequest};

use super::state::{ClientState, Effect, Outcome, SessionSettings};

/// Perform one effect and report how it settled.
///
/// Never fails: every error ends up inside the returned [`Outcome`].
pub async fn perform<B>(backend: &B, effect: Effect) -> Outcome
where
    B: GameBackend + ?Sized,
{
    match effect {
        Effect::StartSession {
            adventure_id,
            player_name,
            discard,
        } => {
            if let Some(old) = discard {
                // Best effort; the new session does not depend on it
                if let Err(e) = backend.delete_session(&old).await {
                    warn!("Failed to discard session {}: {}", old, e);
                }
            }
            let request = NewGameRequest {
                adventure_id,
                player_name,
            };
            Outcome::Started(backend.new_game(&request).await)
        }
        Effect::SendCommand {
            session_id,
            command,
        } => {
            debug!("Sending command to {}: {:?}", session_id, command);
            let request = CommandRequest { command };
            Outcome::Command(backend.send_command(&session_id, &request).await)
        }
    }
}

/// Runs session operations to completion, one at a time
pub struct SessionDriver<B> {
    backend: B,
    settings: SessionSettings,
    state: ClientState,
}

impl<B: GameBackend> SessionDriver<B> {
    pub fn new(backend: B, settings: SessionSettings) -> Self {
        Self {
            backend,
            settings,
            state: ClientState::new(),
        }
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Start the session and wait for the welcome text
    pub async fn initialize_session(&mut self) {
        let (state, effect) = std::mem::take(&mut self.state).begin_start(&self.settings);
        self.run(state, effect).await;
    }

    /// Send one command line and wait for the reply
    pub async fn submit_command(&mut self, line: &str) {
        let (state, effect) = std::mem::take(&mut self.state).submit(line);
        self.run(state, effect).await;
    }

    /// Start over with a fresh session
    #[cfg(test)]
    pub async fn new_game(&mut self) {
        let (state, effect) = std::mem::take(&mut self.state).new_game(&self.settings);
        self.run(state, effect).await;
    }

    async fn run(&mut self, state: ClientState, effect: Option<Effect>) {
        self.state = match effect {
            Some(effect) => {
                let outcome = perform(&self.backend, effect).await;
                state.settle(outcome, &self.settings)
            }
            None => state,
        };
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{http_error, Call, FakeBackend};
    use super::*;
    use crate::api::{NewGameResponse, SessionId};
    use crate::core::state::{Phase, BANNER, COMMAND_FAILED, SUBTITLE};
    use crate::core::transcript::EntryKind;

    fn settings() -> SessionSettings {
        SessionSettings {
            base_url: "http://localhost:8000".to_string(),
            adventure_id: "halloween_2025".to_string(),
            player_name: Some("Ada".to_string()),
        }
    }

    async fn started_driver() -> SessionDriver<FakeBackend> {
        let backend = FakeBackend::new().with_session("abc", "You are in a dark room.");
        let mut driver = SessionDriver::new(backend, settings());
        driver.initialize_session().await;
        driver
    }

    fn kinds_and_texts<B: GameBackend>(driver: &SessionDriver<B>) -> Vec<(EntryKind, String)> {
        driver
            .state()
            .transcript()
            .iter()
            .map(|e| (e.kind(), e.image_url().unwrap_or(e.text()).to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_initialize_transcript() {
        let driver = started_driver().await;
        let out = |s: &str| (EntryKind::Output, s.to_string());
        assert_eq!(
            kinds_and_texts(&driver),
            vec![out(BANNER), out(SUBTITLE), out(""), out("You are in a dark room.")]
        );
        assert!(!driver.state().is_pending());
        assert_eq!(
            driver.backend().calls(),
            vec![Call::NewGame(NewGameRequest {
                adventure_id: "halloween_2025".to_string(),
                player_name: Some("Ada".to_string()),
            })]
        );
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let mut driver = started_driver().await;
        driver.initialize_session().await;
        assert_eq!(driver.backend().calls().len(), 1);
        assert_eq!(driver.state().transcript().len(), 4);
    }

    #[tokio::test]
    async fn test_look_command() {
        let mut driver = started_driver().await;
        driver.backend().push_reply("A dark room. Exits: north.", None);

        driver.submit_command("look").await;
        let tail: Vec<_> = kinds_and_texts(&driver).split_off(4);
        assert_eq!(
            tail,
            vec![
                (EntryKind::InputEcho, "> look".to_string()),
                (EntryKind::Output, String::new()),
                (EntryKind::Output, "A dark room. Exits: north.".to_string()),
            ]
        );
        assert!(!driver.state().is_pending());
        assert_eq!(
            driver.backend().calls().last(),
            Some(&Call::Command(SessionId::new("abc"), "look".to_string()))
        );
    }

    #[tokio::test]
    async fn test_transcript_only_grows() {
        let mut driver = started_driver().await;
        let mut previous = driver.state().transcript().clone();
        for (i, cmd) in ["look", "north", "take candle", "inventory"].iter().enumerate() {
            driver.backend().push_reply(&format!("reply {}", i), None);
            driver.submit_command(cmd).await;

            let current = driver.state().transcript();
            assert!(current.len() > previous.len());
            assert!(previous.iter().zip(current.iter()).all(|(a, b)| a == b));
            assert!(!driver.state().is_pending());
            previous = current.clone();
        }
    }

    #[tokio::test]
    async fn test_blank_submission_sends_nothing() {
        let mut driver = started_driver().await;
        let len = driver.state().transcript().len();
        for line in ["", "   ", "\t \t"] {
            driver.submit_command(line).await;
        }
        assert_eq!(driver.state().transcript().len(), len);
        assert!(!driver.state().is_pending());
        assert_eq!(driver.backend().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_start_blocks_commands() {
        let backend = FakeBackend::new();
        backend.push_new_game(Err(http_error(404)));
        let mut driver = SessionDriver::new(backend, settings());

        driver.initialize_session().await;
        assert!(driver.state().session().is_none());
        assert_eq!(driver.state().phase(), Phase::Failed);
        assert_eq!(driver.state().transcript().len(), 1);
        assert_eq!(
            driver.state().transcript().get(0).map(|e| e.kind()),
            Some(EntryKind::Error)
        );

        driver.submit_command("look").await;
        assert_eq!(driver.state().transcript().len(), 1);
        assert_eq!(driver.backend().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_command_failure_then_recovery() {
        let mut driver = started_driver().await;
        driver.backend().push_command_error(500);
        driver.backend().push_reply("You see a candle.", None);

        driver.submit_command("look").await;
        let state = driver.state();
        assert_eq!(state.session().map(|h| h.session_id.as_str()), Some("abc"));
        assert_eq!(state.transcript().len(), 6);
        assert_eq!(state.transcript().last().map(|e| e.kind()), Some(EntryKind::Error));
        assert_eq!(state.transcript().last().map(|e| e.text()), Some(COMMAND_FAILED));
        assert!(!state.is_pending());

        driver.submit_command("look").await;
        assert_eq!(
            driver.state().transcript().last().map(|e| e.text()),
            Some("You see a candle.")
        );
    }

    #[tokio::test]
    async fn test_image_resolved_once_per_response() {
        let mut driver = started_driver().await;
        driver.backend().push_reply("A mausoleum.", Some("/images/foo.png"));
        driver.backend().push_reply("Nothing new.", None);

        driver.submit_command("enter").await;
        driver.submit_command("wait").await;

        let images: Vec<&str> = driver
            .state()
            .transcript()
            .iter()
            .filter_map(|e| e.image_url())
            .collect();
        assert_eq!(images, vec!["http://localhost:8000/images/foo.png"]);
    }

    #[tokio::test]
    async fn test_new_game_discards_old_session() {
        let mut driver = started_driver().await;
        driver.backend().push_new_game(Ok(NewGameResponse {
            session_id: SessionId::new("def"),
            current_location_id: None,
            inventory: Vec::new(),
            visited_locations: Vec::new(),
            message: "You wake again.".to_string(),
            image_url: None,
        }));

        driver.new_game().await;
        assert_eq!(
            driver.state().session().map(|h| h.session_id.as_str()),
            Some("def")
        );
        let calls = driver.backend().calls();
        assert_eq!(calls[1], Call::Delete(SessionId::new("abc")));
        assert!(matches!(calls[2], Call::NewGame(_)));
        assert_eq!(driver.state().transcript().len(), 9);
    }
}
