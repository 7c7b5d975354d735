//! Terminal binding of the host dialogs.

use std::io::{self, BufRead, Write};

use ghost_points_core::models::NoticeKind;
use ghost_points_core::Notifier;

/// Prints notices to `output` and reads confirmations from `input`.
pub struct TerminalNotifier<R, W> {
    input: R,
    output: W,
    assume_yes: bool,
}

impl<R: BufRead, W: Write> TerminalNotifier<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            assume_yes: false,
        }
    }

    /// Answer every confirmation with yes without reading input.
    pub fn assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }

    /// Reads one line of input, `None` at end of input.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, title: &str, message: &str) -> io::Result<bool> {
        write!(self.output, "{}: {} [y/N] ", title, message)?;
        if self.assume_yes {
            writeln!(self.output, "y")?;
            return Ok(true);
        }
        self.output.flush()?;

        let answer = self.read_line()?.unwrap_or_default();
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}

impl<R: BufRead, W: Write> Notifier for TerminalNotifier<R, W> {
    fn notify(&mut self, kind: NoticeKind, title: &str, message: &str) {
        let label = match kind {
            NoticeKind::Information => "info",
            NoticeKind::Warning => "warning",
            NoticeKind::Critical => "error",
        };
        if let Err(e) = writeln!(self.output, "[{}] {}: {}", label, title, message) {
            tracing::warn!("Failed to write notice: {}", e);
        }
    }

    fn confirm(&mut self, title: &str, message: &str) -> bool {
        self.ask(title, message).unwrap_or_else(|e| {
            tracing::warn!("Failed to read confirmation, treating as no: {}", e);
            false
        })
    }
}
