//! Transcript renderer using crossterm
//!
//! Screen layout, top to bottom:
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ transcript (auto-scrolling)  │
//! │ loading indicator (if busy)  │
//! ├──────────────────────────────┤
//! │ > command input              │
//! │ status bar (optional)        │
//! └──────────────────────────────┘
//! ```

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::{Color, ColorScheme};
use crate::core::state::{ClientState, PROMPT};
use crate::core::EntryKind;

/// Loading indicator animation frames
pub const LOADING_FRAMES: [&str; 4] = ["   ", ".  ", ".. ", "..."];

/// Columns between tab stops in transcript text
const TAB_WIDTH: usize = 4;

/// How a laid-out line is styled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Entry(EntryKind),
    Loading,
}

/// One screen row of transcript output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLine {
    pub text: String,
    pub style: LineStyle,
}

/// Lay out the transcript as screen rows of at most `width` columns.
///
/// Entries keep their append order. While a request is pending the loading
/// indicator follows the last entry.
pub fn layout(state: &ClientState, width: usize, loading_frame: usize) -> Vec<ViewLine> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for entry in state.transcript().iter() {
        let style = LineStyle::Entry(entry.kind());
        let text = match entry.image_url() {
            Some(url) => format!("[image] {}", url),
            None => entry.text().to_string(),
        };
        for raw in text.split('\n') {
            for row in wrap(&sanitize(raw), width) {
                lines.push(ViewLine { text: row, style });
            }
        }
    }

    if state.is_pending() {
        let frame = LOADING_FRAMES[loading_frame % LOADING_FRAMES.len()];
        lines.push(ViewLine {
            text: frame.to_string(),
            style: LineStyle::Loading,
        });
    }

    lines
}

/// Make one line of backend text safe to print.
///
/// Tabs become spaces up to the next tab stop. Other control characters
/// (ESC included) are dropped so no escape sequence reaches the terminal.
pub fn sanitize(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut col = 0;
    for ch in line.chars() {
        if ch == '\t' {
            let stop = (col / TAB_WIDTH + 1) * TAB_WIDTH;
            out.extend(std::iter::repeat(' ').take(stop - col));
            col = stop;
        } else if !ch.is_control() {
            out.push(ch);
            col += ch.width().unwrap_or(0);
        }
    }
    out
}

/// Soft-wrap `text` to `width` display columns, breaking at spaces when possible
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let text = text.trim_end_matches('\r');
    if text.width() <= width {
        return vec![text.to_string()];
    }

    let mut rows = Vec::new();
    let mut row = String::new();
    let mut row_width = 0;
    // Byte offset in `row` just after the last space, with the width up to it
    let mut last_break: Option<(usize, usize)> = None;

    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if row_width + ch_width > width && !row.is_empty() {
            match last_break {
                Some((at, at_width)) if at < row.len() => {
                    let rest = row.split_off(at);
                    rows.push(row.trim_end().to_string());
                    row = rest;
                    row_width -= at_width;
                }
                _ => {
                    rows.push(row.trim_end().to_string());
                    row.clear();
                    row_width = 0;
                }
            }
            last_break = None;
        }
        row.push(ch);
        row_width += ch_width;
        if ch == ' ' {
            last_break = Some((row.len(), row_width));
        }
    }
    if !row.is_empty() || rows.is_empty() {
        rows.push(row);
    }
    rows
}

/// Scroll position over the laid-out transcript
#[derive(Debug, Default)]
pub struct TranscriptView {
    /// Rows scrolled up from the bottom (0 = following the newest entry)
    scroll_offset: usize,
    /// Transcript length seen last frame
    seen_len: usize,
}

impl TranscriptView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to the bottom whenever the transcript has grown
    pub fn follow(&mut self, transcript_len: usize) {
        if transcript_len > self.seen_len {
            self.scroll_offset = 0;
        }
        self.seen_len = transcript_len;
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(rows);
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(rows);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn is_scrolled(&self) -> bool {
        self.scroll_offset > 0
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// The rows to show in a viewport of `height` rows
    pub fn visible<'a>(&mut self, lines: &'a [ViewLine], height: usize) -> &'a [ViewLine] {
        let max_offset = lines.len().saturating_sub(height);
        self.scroll_offset = self.scroll_offset.min(max_offset);
        let end = lines.len() - self.scroll_offset;
        let start = end.saturating_sub(height);
        &lines[start..end]
    }
}

/// Fit the input line into `avail` columns, keeping the cursor visible.
///
/// Returns the visible slice and the cursor column within it.
pub fn input_window(text: &str, cursor: usize, avail: usize) -> (String, usize) {
    let chars: Vec<char> = text.chars().collect();
    let cursor = cursor.min(chars.len());
    let avail = avail.max(1);

    // Walk back from the cursor until the window is full
    let mut start = cursor;
    let mut used = 0;
    while start > 0 {
        let w = chars[start - 1].width().unwrap_or(0);
        if used + w >= avail {
            break;
        }
        used += w;
        start -= 1;
    }

    let mut visible = String::new();
    let mut width = 0;
    for ch in &chars[start..] {
        let w = ch.width().unwrap_or(0);
        if width + w > avail {
            break;
        }
        visible.push(*ch);
        width += w;
    }
    (visible, used)
}

/// Terminal renderer
pub struct Renderer {
    initialized: bool,
    pub color_scheme: ColorScheme,
    status_bar: bool,
}

impl Renderer {
    pub fn new(color_scheme: ColorScheme, status_bar: bool) -> Self {
        Self {
            initialized: false,
            color_scheme,
            status_bar,
        }
    }

    /// Initialize the terminal
    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;

        let mut stdout = io::stdout();
        queue!(
            stdout,
            EnterAlternateScreen,
            crossterm::event::EnableBracketedPaste,
            Clear(ClearType::All),
            MoveTo(0, 0)
        )?;
        stdout.flush()?;

        self.initialized = true;
        Ok(())
    }

    /// Cleanup
    pub fn cleanup(&mut self) -> io::Result<()> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;

        let mut stdout = io::stdout();
        let _ = queue!(
            stdout,
            ResetColor,
            SetAttribute(Attribute::Reset),
            Show,
            crossterm::event::DisableBracketedPaste,
            LeaveAlternateScreen
        );
        let _ = stdout.flush();

        // Disable raw mode - this is the most important part
        terminal::disable_raw_mode()
    }

    /// Get terminal size
    pub fn size() -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Rows available to the transcript for a terminal `rows` high
    pub fn transcript_height(&self, rows: u16) -> usize {
        let reserved = if self.status_bar { 2 } else { 1 };
        (rows as usize).saturating_sub(reserved)
    }

    /// Render a full frame
    pub fn render(
        &self,
        state: &ClientState,
        view: &mut TranscriptView,
        loading_frame: usize,
    ) -> io::Result<()> {
        let (cols, rows) = Self::size()?;
        let width = cols as usize;
        let height = self.transcript_height(rows);

        let stdout = io::stdout();
        let mut out = io::BufWriter::with_capacity(65536, stdout.lock());

        // Begin synchronized update (reduces flicker)
        write!(out, "\x1b[?2026h")?;
        queue!(out, Hide)?;

        let lines = layout(state, width, loading_frame);
        let visible = view.visible(&lines, height);
        for y in 0..height {
            queue!(out, MoveTo(0, y as u16))?;
            if let Some(line) = visible.get(y) {
                let (fg, bold) = self.line_color(line.style);
                if bold {
                    queue!(out, SetAttribute(Attribute::Bold))?;
                }
                queue!(out, SetForegroundColor(fg.to_crossterm()), Print(&line.text))?;
                queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
            }
            queue!(out, Clear(ClearType::UntilNewLine))?;
        }

        let input_y = height as u16;
        let cursor_col = self.render_input(&mut out, state, input_y, width)?;

        if self.status_bar {
            self.render_status_bar(&mut out, state, view, input_y + 1, width)?;
        }

        if let Some(col) = cursor_col {
            queue!(out, MoveTo(col, input_y), Show)?;
        }

        // End synchronized update
        write!(out, "\x1b[?2026l")?;
        out.flush()
    }

    fn line_color(&self, style: LineStyle) -> (Color, bool) {
        let cs = &self.color_scheme;
        match style {
            LineStyle::Entry(EntryKind::Output) => (cs.output_fg, false),
            LineStyle::Entry(EntryKind::InputEcho) => (cs.echo_fg, true),
            LineStyle::Entry(EntryKind::Error) => (cs.error_fg, true),
            LineStyle::Entry(EntryKind::Image) => (cs.image_fg, false),
            LineStyle::Loading => (cs.loading_fg, false),
        }
    }

    /// Render the command line. Returns the cursor column when the input has focus.
    fn render_input<W: Write>(
        &self,
        out: &mut W,
        state: &ClientState,
        y: u16,
        width: usize,
    ) -> io::Result<Option<u16>> {
        let cs = &self.color_scheme;
        let fg = if state.accepts_input() {
            cs.input_fg
        } else {
            cs.input_disabled_fg
        };

        let prompt_width = PROMPT.width();
        let avail = width.saturating_sub(prompt_width + 1);
        let input = state.input();
        let (visible, cursor) = input_window(input.text(), input.cursor(), avail);

        queue!(
            out,
            MoveTo(0, y),
            SetForegroundColor(fg.to_crossterm()),
            Print(PROMPT),
            Print(&visible),
            ResetColor,
            Clear(ClearType::UntilNewLine)
        )?;

        if state.input_focused() {
            Ok(Some((prompt_width + cursor) as u16))
        } else {
            Ok(None)
        }
    }

    /// Render the status bar
    fn render_status_bar<W: Write>(
        &self,
        out: &mut W,
        state: &ClientState,
        view: &TranscriptView,
        y: u16,
        width: usize,
    ) -> io::Result<()> {
        let cs = &self.color_scheme;
        let (bg, fg) = if view.is_scrolled() {
            (cs.status_alert_bg, cs.status_alert_fg)
        } else {
            (cs.status_bar_bg, cs.status_bar_fg)
        };

        let status = status_text(state, view);
        let shortcuts = "Ctrl+N: new game | PgUp/PgDn: scroll | Esc: quit";

        let left_len = status.width();
        let right_len = shortcuts.width();
        let line = if left_len + right_len + 2 <= width {
            let padding = width - left_len - right_len - 2;
            format!(" {}{:padding$}{} ", status, "", shortcuts, padding = padding)
        } else {
            let mut s = format!(" {}", status);
            let w = s.width();
            if w < width {
                s.push_str(&" ".repeat(width - w));
            }
            s
        };
        let (line, _) = input_window(&line, 0, width);

        queue!(
            out,
            MoveTo(0, y),
            SetBackgroundColor(bg.to_crossterm()),
            SetForegroundColor(fg.to_crossterm()),
            Print(line),
            ResetColor
        )?;
        Ok(())
    }
}

/// Left side of the status bar
pub fn status_text(state: &ClientState, view: &TranscriptView) -> String {
    let mut parts = vec!["ZAIK".to_string(), state.phase().label().to_string()];
    let location = state.location();
    if let Some(id) = &location.location_id {
        parts.push(sanitize(id));
    }
    if state.session().is_some() {
        let n = location.inventory.len();
        parts.push(format!("{} item{}", n, if n == 1 { "" } else { "s" }));
    }
    if view.is_scrolled() {
        parts.push(format!("[↑ {} lines]", view.scroll_offset()));
    }
    parts.join(" | ")
}

impl Drop for Renderer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
