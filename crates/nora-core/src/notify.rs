//! Notification types and the `Notifier` collaborator trait.
//!
//! Notifications are fire-and-forget. A sink shows at most one at a time and
//! dismisses it after its duration.

use chrono::TimeDelta;
use strum::Display;

/// Default on-screen duration.
pub const DEFAULT_DURATION_MS: i64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
  Success,
  Error,
  #[default]
  Info,
}

/// A single notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
  pub message:  String,
  pub severity: Severity,
  pub duration: TimeDelta,
}

impl Toast {
  pub fn new(message: impl Into<String>, severity: Severity) -> Self {
    Self {
      message: message.into(),
      severity,
      duration: TimeDelta::milliseconds(DEFAULT_DURATION_MS),
    }
  }

  pub fn with_duration_ms(mut self, ms: i64) -> Self {
    self.duration = TimeDelta::milliseconds(ms);
    self
  }
}

/// Somewhere to surface operation outcomes to the user.
pub trait Notifier: Send + Sync {
  fn notify(&self, toast: Toast);

  fn success(&self, message: &str) {
    self.notify(Toast::new(message, Severity::Success));
  }

  fn error(&self, message: &str) {
    self.notify(Toast::new(message, Severity::Error));
  }

  fn info(&self, message: &str) {
    self.notify(Toast::new(message, Severity::Info));
  }
}
