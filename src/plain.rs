//! Line mode for pipes and dumb terminals
//!
//! Reads commands from stdin one line at a time and prints each new
//! transcript entry to stdout. Used when stdout is not a terminal or when
//! `--plain` is given.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::api::GameBackend;
use crate::core::{EntryKind, Phase, SessionDriver, TranscriptEntry};
use crate::ui::renderer::sanitize;

/// Format one entry for line output
pub fn format_entry(entry: &TranscriptEntry) -> String {
    match (entry.kind(), entry.image_url()) {
        (EntryKind::Image, Some(url)) => format!("[image] {}", sanitize(url)),
        _ => entry
            .text()
            .split('\n')
            .map(sanitize)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn print_since<W: Write>(out: &mut W, entries: &[TranscriptEntry]) -> std::io::Result<()> {
    for entry in entries {
        writeln!(out, "{}", format_entry(entry))?;
    }
    out.flush()
}

/// Play a session over stdin/stdout until EOF
pub async fn run<B: GameBackend>(driver: &mut SessionDriver<B>) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut printed = 0;

    driver.initialize_session().await;
    {
        let transcript = driver.state().transcript();
        print_since(&mut stdout.lock(), transcript.since(printed))?;
        printed = transcript.len();
    }
    if driver.state().phase() == Phase::Failed {
        anyhow::bail!("the game could not be started");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        driver.submit_command(&line).await;
        let transcript = driver.state().transcript();
        print_since(&mut stdout.lock(), transcript.since(printed))?;
        printed = transcript.len();
    }

    info!("Input closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_entry() {
        assert_eq!(format_entry(&TranscriptEntry::input_echo("> ", "look")), "> look");
        assert_eq!(
            format_entry(&TranscriptEntry::image("http://localhost:8000/images/a.png")),
            "[image] http://localhost:8000/images/a.png"
        );
    }

    #[test]
    fn test_format_entry_drops_escape_sequences() {
        let entry = TranscriptEntry::output("Dark\x1b[2J\nroom");
        assert_eq!(format_entry(&entry), "Dark[2J\nroom");
    }

    #[test]
    fn test_print_since_writes_lines() {
        let entries = vec![
            TranscriptEntry::output("A crypt."),
            TranscriptEntry::error("Error: failed to process command."),
        ];
        let mut buf = Vec::new();
        print_since(&mut buf, &entries).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "A crypt.\nError: failed to process command.\n"
        );
    }
}
