//! User-visible error notifications.

use owo_colors::OwoColorize;
use parking_lot::Mutex;

/// Fire-and-forget sink for messages the user must see.
pub trait Notifier: Send + Sync {
    fn notify_error(&self, message: &str);
}

/// Prints notifications to stderr, red when `color` is on.
pub struct TerminalNotifier {
    color: bool,
}

impl TerminalNotifier {
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl Notifier for TerminalNotifier {
    fn notify_error(&self, message: &str) {
        tracing::error!("{}", message);
        if self.color {
            eprintln!("{}", message.red());
        } else {
            eprintln!("{}", message);
        }
    }
}

/// Keeps every notification in memory.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_error(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
