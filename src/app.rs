//! Interactive event loop
//!
//! The loop owns the [`ClientState`] and is the only place transitions are
//! applied. Requests run as tasks on the tokio runtime and report back over a
//! channel that the loop drains between terminal event polls.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::api::GameBackend;
use crate::core::{perform, ClientState, Effect, InputEdit, Outcome, SessionSettings};
use crate::ui::{Action, KeyMapper, Renderer, TranscriptView};

/// How long to wait for terminal input before checking for outcomes
const POLL_TIMEOUT: Duration = Duration::from_millis(30);

/// Terminal session client
pub struct App {
    state: ClientState,
    settings: SessionSettings,
    backend: Arc<dyn GameBackend>,
    runtime: Handle,
    outcome_tx: Sender<Outcome>,
    outcome_rx: Receiver<Outcome>,
    view: TranscriptView,
    loading_frame: usize,
    frame_interval: Duration,
    quit: bool,
}

impl App {
    pub fn new(
        backend: Arc<dyn GameBackend>,
        settings: SessionSettings,
        runtime: Handle,
        frame_interval: Duration,
    ) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel();
        Self {
            state: ClientState::new(),
            settings,
            backend,
            runtime,
            outcome_tx,
            outcome_rx,
            view: TranscriptView::new(),
            loading_frame: 0,
            frame_interval,
            quit: false,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &ClientState {
        &self.state
    }

    /// Run until the player quits
    pub fn run(&mut self, renderer: &mut Renderer) -> anyhow::Result<()> {
        self.start();

        let mut last_tick = Instant::now();
        let mut dirty = true;

        while !self.quit {
            if self.drain_outcomes() {
                dirty = true;
            }

            // Animate the loading indicator while a request is out
            if self.state.is_pending() && last_tick.elapsed() >= self.frame_interval {
                self.loading_frame = self.loading_frame.wrapping_add(1);
                last_tick = Instant::now();
                dirty = true;
            }

            if dirty {
                self.view.follow(self.state.transcript().len());
                renderer.render(&self.state, &mut self.view, self.loading_frame)?;
                dirty = false;
            }

            if event::poll(POLL_TIMEOUT)? {
                dirty = self.handle_event(event::read()?, renderer);
            }
        }

        info!("Quit requested");
        Ok(())
    }

    /// Start the session and show the welcome text, once at startup
    pub fn start(&mut self) {
        self.transition(|state, settings| state.begin_start(settings));
    }

    /// Handle one terminal event. Returns true when a redraw is needed.
    fn handle_event(&mut self, evt: Event, renderer: &Renderer) -> bool {
        match evt {
            Event::Key(key_event) => {
                if key_event.kind != KeyEventKind::Press {
                    return false;
                }
                match KeyMapper::map(&key_event) {
                    Some(action) => {
                        let page = match Renderer::size() {
                            Ok((_, rows)) => renderer.transcript_height(rows).max(1),
                            Err(_) => 10,
                        };
                        self.apply_action(action, page);
                        true
                    }
                    None => false,
                }
            }
            Event::Paste(text) => {
                self.edit(InputEdit::InsertStr(text));
                true
            }
            Event::Resize(cols, rows) => {
                debug!("Resize: {}x{}", cols, rows);
                true
            }
            _ => false,
        }
    }

    pub fn apply_action(&mut self, action: Action, page: usize) {
        match action {
            Action::Edit(edit) => self.edit(edit),
            Action::Submit => self.transition(|state, _| state.submit_input()),
            Action::NewGame => self.transition(|state, settings| state.new_game(settings)),
            Action::ScrollUp => self.view.scroll_up(page),
            Action::ScrollDown => self.view.scroll_down(page),
            Action::ScrollBottom => self.view.scroll_to_bottom(),
            Action::PasteClipboard => {
                if let Some(text) = paste_from_clipboard() {
                    self.edit(InputEdit::InsertStr(text));
                }
            }
            Action::Quit => self.quit = true,
        }
    }

    fn edit(&mut self, edit: InputEdit) {
        self.state = std::mem::take(&mut self.state).with_input(edit);
    }

    /// Apply a transition and dispatch the effect it requests
    fn transition<F>(&mut self, f: F)
    where
        F: FnOnce(ClientState, &SessionSettings) -> (ClientState, Option<Effect>),
    {
        let (state, effect) = f(std::mem::take(&mut self.state), &self.settings);
        self.state = state;
        if let Some(effect) = effect {
            self.dispatch(effect);
        }
    }

    /// Run an effect on the runtime; its outcome comes back over the channel
    fn dispatch(&self, effect: Effect) {
        let backend = Arc::clone(&self.backend);
        let tx = self.outcome_tx.clone();
        self.runtime.spawn(async move {
            let outcome = perform(backend.as_ref(), effect).await;
            if tx.send(outcome).is_err() {
                debug!("Client closed before request settled");
            }
        });
    }

    /// Apply any settled outcomes. Returns true if something changed.
    fn drain_outcomes(&mut self) -> bool {
        let mut changed = false;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.settle(outcome);
            changed = true;
        }
        changed
    }

    fn settle(&mut self, outcome: Outcome) {
        self.state = std::mem::take(&mut self.state).settle(outcome, &self.settings);
    }

    /// Block until one outcome settles
    #[cfg(test)]
    fn wait_settled(&mut self) {
        let outcome = self
            .outcome_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("request did not settle");
        self.settle(outcome);
    }
}

/// Read text from the system clipboard
fn paste_from_clipboard() -> Option<String> {
    match arboard::Clipboard::new().and_then(|mut cb| cb.get_text()) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("Clipboard unavailable: {}", e);
            None
        }
    }
}
