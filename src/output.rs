use std::io::Write;
#[cfg(test)]
use std::sync::Mutex;

use colored::Colorize;

use crate::types::Outcome;

/// Surface the handler overwrites with each outcome.
pub trait OutputSink: Send + Sync {
    fn render(&self, outcome: &Outcome);
}

/// Writes each outcome as one line on stdout; failures in red.
#[derive(Default)]
pub struct TerminalSink;

impl OutputSink for TerminalSink {
    fn render(&self, outcome: &Outcome) {
        let text = outcome.display_text();
        let line = if outcome.is_failure() {
            text.red().to_string()
        } else {
            text
        };
        // One locked write per outcome so concurrent lines stay whole.
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{line}");
        let _ = stdout.flush();
    }
}

/// Holds the last rendered text, plus every write in order.
#[cfg(test)]
#[derive(Default)]
pub struct MemorySink {
    writes: Mutex<Vec<String>>,
}

#[cfg(test)]
impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current content; empty before the first write.
    pub fn text(&self) -> String {
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
            .unwrap_or_default()
    }

    pub fn history(&self) -> Vec<String> {
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[cfg(test)]
impl OutputSink for MemorySink {
    fn render(&self, outcome: &Outcome) {
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(outcome.display_text());
    }
}
