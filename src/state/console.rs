// Console state management.
// In-app activity log for phase transitions, successes, and errors.

use chrono::{DateTime, Utc};
use ratatui::widgets::ListState;

/// Console message level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Info,
    Warn,
    Error,
}

/// A console message for the activity log.
#[derive(Debug, Clone)]
pub struct ConsoleMessage {
    pub level: ConsoleLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// The activity log shown on the Console tab.
#[derive(Debug, Default)]
pub struct Console {
    /// Console messages, oldest first.
    pub messages: Vec<ConsoleMessage>,
    /// List state for message scrolling.
    pub list_state: ListState,
    /// Total errors logged, used for the unread badge.
    pub errors_total: u64,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_info(&mut self, message: impl Into<String>) {
        self.log(ConsoleLevel::Info, message);
    }

    pub fn log_warn(&mut self, message: impl Into<String>) {
        self.log(ConsoleLevel::Warn, message);
    }

    pub fn log_error(&mut self, message: impl Into<String>) {
        self.errors_total += 1;
        self.log(ConsoleLevel::Error, message);
    }

    /// Append a message and keep the newest one selected.
    fn log(&mut self, level: ConsoleLevel, message: impl Into<String>) {
        self.messages.push(ConsoleMessage {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        });
        self.list_state.select(Some(self.messages.len() - 1));
    }

    /// Select the previous (older) message.
    pub fn select_prev(&mut self) {
        if self.messages.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => self.messages.len() - 1,
        };
        self.list_state.select(Some(i));
    }

    /// Select the next (newer) message.
    pub fn select_next(&mut self) {
        if self.messages.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.messages.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_scrolls_to_bottom() {
        let mut console = Console::new();
        console.log_info("first");
        console.log_warn("second");
        console.log_error("third");

        assert_eq!(console.messages.len(), 3);
        assert_eq!(console.list_state.selected(), Some(2));
        assert_eq!(console.errors_total, 1);
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut console = Console::new();
        console.log_info("only");

        console.select_next();
        assert_eq!(console.list_state.selected(), Some(0));
        console.select_prev();
        assert_eq!(console.list_state.selected(), Some(0));
    }
}
