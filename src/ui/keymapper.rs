//! Key mapping for the command line
//!
//! Converts crossterm key events to client actions.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::core::InputEdit;

/// What a key press asks the client to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Edit the command line
    Edit(InputEdit),
    /// Submit the command line
    Submit,
    /// Scroll the transcript up/down by a page
    ScrollUp,
    ScrollDown,
    /// Jump back to the newest entry
    ScrollBottom,
    /// Paste from the system clipboard
    PasteClipboard,
    /// Start a fresh game session
    NewGame,
    Quit,
}

/// Key mapper for converting key events to actions
pub struct KeyMapper;

impl KeyMapper {
    /// Map a crossterm KeyEvent to an action
    pub fn map(event: &KeyEvent) -> Option<Action> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);

        match event.code {
            KeyCode::Char(ch) if ctrl => Self::map_ctrl(ch),
            KeyCode::Char(ch) => Some(Action::Edit(InputEdit::Insert(ch))),

            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Esc => Some(Action::Quit),

            KeyCode::Backspace => Some(Action::Edit(InputEdit::Backspace)),
            KeyCode::Delete => Some(Action::Edit(InputEdit::Delete)),
            KeyCode::Left => Some(Action::Edit(InputEdit::Left)),
            KeyCode::Right => Some(Action::Edit(InputEdit::Right)),
            KeyCode::Home => Some(Action::Edit(InputEdit::Home)),
            KeyCode::End if ctrl => Some(Action::ScrollBottom),
            KeyCode::End => Some(Action::Edit(InputEdit::End)),

            KeyCode::PageUp => Some(Action::ScrollUp),
            KeyCode::PageDown => Some(Action::ScrollDown),

            _ => None,
        }
    }

    /// Map Ctrl + character
    fn map_ctrl(ch: char) -> Option<Action> {
        match ch.to_ascii_lowercase() {
            'c' | 'd' => Some(Action::Quit),
            'n' => Some(Action::NewGame),
            'v' => Some(Action::PasteClipboard),
            'u' => Some(Action::Edit(InputEdit::Clear)),
            'a' => Some(Action::Edit(InputEdit::Home)),
            'e' => Some(Action::Edit(InputEdit::End)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn test_char_keys() {
        let event = key_event(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), Some(Action::Edit(InputEdit::Insert('a'))));

        let event = key_event(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(KeyMapper::map(&event), Some(Action::Edit(InputEdit::Insert('A'))));

        let event = key_event(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(KeyMapper::map(&event), Some(Action::Quit));

        let event = key_event(KeyCode::Char('N'), KeyModifiers::CONTROL | KeyModifiers::SHIFT);
        assert_eq!(KeyMapper::map(&event), Some(Action::NewGame));

        let event = key_event(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert_eq!(KeyMapper::map(&event), None);
    }

    #[test]
    fn test_navigation_keys() {
        let event = key_event(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), Some(Action::Submit));

        let event = key_event(KeyCode::End, KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), Some(Action::Edit(InputEdit::End)));

        let event = key_event(KeyCode::End, KeyModifiers::CONTROL);
        assert_eq!(KeyMapper::map(&event), Some(Action::ScrollBottom));

        let event = key_event(KeyCode::PageUp, KeyModifiers::NONE);
        assert_eq!(KeyMapper::map(&event), Some(Action::ScrollUp));
    }

    #[test]
    fn test_release_ignored() {
        let mut event = key_event(KeyCode::Enter, KeyModifiers::NONE);
        event.kind = KeyEventKind::Release;
        assert_eq!(KeyMapper::map(&event), None);
    }

    #[test]
    fn test_history_keys_unmapped() {
        // Up/Down are reserved for command history, which is not wired up
        assert_eq!(KeyMapper::map(&key_event(KeyCode::Up, KeyModifiers::NONE)), None);
        assert_eq!(KeyMapper::map(&key_event(KeyCode::Down, KeyModifiers::NONE)), None);
    }
}
