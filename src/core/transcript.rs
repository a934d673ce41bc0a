//! Transcript model
//!
//! The transcript is the ordered list of lines shown to the player. Entries
//! are only ever appended.

/// What an entry represents (drives styling)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Text from the game (or the client's own banner)
    Output,
    /// The player's command, echoed with the prompt marker
    InputEcho,
    /// A failure the player should know about
    Error,
    /// A reference to an image to show in place of text
    Image,
}

/// A single immutable transcript line/block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    text: String,
    kind: EntryKind,
    image_url: Option<String>,
}

impl TranscriptEntry {
    pub fn output(text: impl Into<String>) -> Self {
        Self::text_entry(EntryKind::Output, text)
    }

    /// A blank separator line
    pub fn blank() -> Self {
        Self::output("")
    }

    pub fn input_echo(prompt: &str, line: &str) -> Self {
        Self::text_entry(EntryKind::InputEcho, format!("{}{}", prompt, line))
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::text_entry(EntryKind::Error, text)
    }

    /// An image entry. `url` must already be absolute.
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            kind: EntryKind::Image,
            image_url: Some(url.into()),
        }
    }

    fn text_entry(kind: EntryKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
            image_url: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}

/// Append-only sequence of transcript entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn get(&self, index: usize) -> Option<&TranscriptEntry> {
        self.entries.get(index)
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries.iter()
    }

    /// Entries appended at or after `index`
    pub fn since(&self, index: usize) -> &[TranscriptEntry] {
        &self.entries[index.min(self.entries.len())..]
    }
}
