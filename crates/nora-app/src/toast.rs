//! [`ToastSlot`] — a single-slot notifier.
//!
//! Holds at most one notification. A new one replaces the current one;
//! nothing queues. A notification disappears once its duration has elapsed
//! since it was shown.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use nora_core::notify::{Notifier, Toast};

/// A notification together with when it appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveToast {
  pub toast:    Toast,
  pub shown_at: DateTime<Utc>,
}

impl ActiveToast {
  pub fn expires_at(&self) -> DateTime<Utc> { self.shown_at + self.toast.duration }

  pub fn is_expired(&self, now: DateTime<Utc>) -> bool { now >= self.expires_at() }
}

#[derive(Debug, Default)]
pub struct ToastSlot {
  current: Mutex<Option<ActiveToast>>,
}

impl ToastSlot {
  pub fn new() -> Self { Self::default() }

  fn slot(&self) -> MutexGuard<'_, Option<ActiveToast>> {
    self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  pub fn show_at(&self, toast: Toast, now: DateTime<Utc>) {
    *self.slot() = Some(ActiveToast { toast, shown_at: now });
  }

  /// The visible notification at `now`, dropping it if it has expired.
  pub fn current_at(&self, now: DateTime<Utc>) -> Option<ActiveToast> {
    let mut slot = self.slot();
    if slot.as_ref().is_some_and(|t| t.is_expired(now)) {
      *slot = None;
    }
    slot.clone()
  }

  pub fn current(&self) -> Option<ActiveToast> { self.current_at(Utc::now()) }

  /// Remove the visible notification, returning it.
  pub fn dismiss(&self) -> Option<ActiveToast> { self.slot().take() }
}

impl Notifier for ToastSlot {
  fn notify(&self, toast: Toast) {
    tracing::debug!(severity = %toast.severity, message = %toast.message, "toast");
    self.show_at(toast, Utc::now());
  }
}
