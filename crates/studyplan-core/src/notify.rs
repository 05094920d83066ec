use std::io::{self, Write};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

pub const TOAST_DURATION: Duration = Duration::from_secs(5);

/// Where due alarms and timer completions are announced.
pub trait Notifier {
    fn notify(&mut self, message: &str);

    fn alarm(&mut self);
}

#[derive(Debug, Clone)]
pub struct TerminalNotifier {
    bell: bool,
}

impl TerminalNotifier {
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&mut self, message: &str) {
        debug!(message, "notification");
        if let Err(err) = writeln!(io::stderr().lock(), "🔔 {message}") {
            warn!(error = %err, "failed to write notification");
        }
    }

    fn alarm(&mut self) {
        if !self.bell {
            return;
        }
        let mut stderr = io::stderr().lock();
        if let Err(err) = stderr.write_all(b"\x07").and_then(|_| stderr.flush()) {
            warn!(error = %err, "failed to ring terminal bell");
        }
    }
}

/// Keeps every call; useful wherever output must be inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    pub messages: Vec<String>,
    pub alarms: usize,
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn alarm(&mut self) {
        self.alarms += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub expires_at: Instant,
}

/// Transient messages for the dashboard; each expires after [`TOAST_DURATION`].
#[derive(Debug, Clone, Default)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
}

impl ToastQueue {
    pub fn push(&mut self, message: impl Into<String>, now: Instant) {
        self.toasts.push(Toast {
            message: message.into(),
            expires_at: now + TOAST_DURATION,
        });
    }

    pub fn dismiss(&mut self, index: usize) -> Option<Toast> {
        (index < self.toasts.len()).then(|| self.toasts.remove(index))
    }

    pub fn prune(&mut self, now: Instant) {
        self.toasts.retain(|toast| toast.expires_at > now);
    }

    pub fn visible(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}
