//! [`PinSettings`] — the modal flow that sets, changes and removes the PIN.
//!
//! ```text
//! enable:  EnterNew ─(6 digits)─▶ ConfirmNew ─(match)─▶ Closed, PIN stored
//!                ▲                    │
//!                └────(mismatch)──────┘
//! disable: ConfirmRemoval ─(matches stored)─▶ Closed, PIN erased
//!                 ▲   │
//!                 └───┘ (wrong PIN, retry)
//! ```
//!
//! Any step can be cancelled. Attempts are unlimited.

use std::sync::{
  Arc,
  atomic::{AtomicBool, Ordering},
};

use nora_core::{
  notify::Notifier,
  pin::Pin,
  store::{PIN_KEY, SecretStore},
};

use crate::otp::OtpBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinStep {
  Closed,
  EnterNew,
  ConfirmNew,
  ConfirmRemoval,
}

/// What a completed entry did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinEvent {
  /// First entry held; waiting for confirmation.
  CandidateHeld,
  Enabled,
  /// Confirmation differed; back to the first entry.
  Mismatch,
  Disabled,
  /// Removal entry did not match the stored PIN.
  WrongPin,
  /// Secret storage failed; nothing changed.
  StorageFailed,
}

pub struct PinSettings<S: SecretStore, N: Notifier> {
  secrets:     Arc<S>,
  notifier:    Arc<N>,
  step:        PinStep,
  candidate:   Option<Pin>,
  otp:         OtpBuffer,
  /// Shared with the [`SessionGate`](crate::session::SessionGate) that
  /// created this flow, if any.
  pin_enabled: Arc<AtomicBool>,
  loading:     bool,
}

impl<S: SecretStore, N: Notifier> PinSettings<S, N> {
  pub fn new(secrets: Arc<S>, notifier: Arc<N>) -> Self {
    Self::sharing(secrets, notifier, Arc::default())
  }

  /// A flow that writes PIN status changes into `pin_enabled`.
  pub(crate) fn sharing(
    secrets: Arc<S>,
    notifier: Arc<N>,
    pin_enabled: Arc<AtomicBool>,
  ) -> Self {
    Self {
      secrets,
      notifier,
      step: PinStep::Closed,
      candidate: None,
      otp: OtpBuffer::new(),
      pin_enabled,
      loading: true,
    }
  }

  pub fn step(&self) -> PinStep { self.step }

  pub fn pin_enabled(&self) -> bool { self.pin_enabled.load(Ordering::SeqCst) }

  fn set_pin_enabled(&self, enabled: bool) { self.pin_enabled.store(enabled, Ordering::SeqCst); }

  pub fn is_loading(&self) -> bool { self.loading }

  pub fn otp(&self) -> &OtpBuffer { &self.otp }

  /// Read whether a PIN is configured.
  pub async fn load(&mut self) {
    match self.secrets.get_secret(PIN_KEY).await {
      Ok(pin) => self.set_pin_enabled(pin.is_some()),
      Err(e) => {
        tracing::error!(error = %e, "failed to check PIN status");
        self.notifier.error("Could not check PIN status");
      }
    }
    self.loading = false;
  }

  /// Open the flow for the requested switch position. Enabling while a PIN
  /// already exists replaces it.
  pub fn toggle(&mut self, enable: bool) {
    self.reset();
    self.step = if enable { PinStep::EnterNew } else { PinStep::ConfirmRemoval };
  }

  pub fn cancel(&mut self) {
    self.reset();
    self.step = PinStep::Closed;
  }

  fn reset(&mut self) {
    self.otp.clear();
    self.candidate = None;
  }

  // ── Entry ───────────────────────────────────────────────────────────────

  pub async fn input(&mut self, index: usize, text: &str) -> Option<PinEvent> {
    if self.step == PinStep::Closed {
      return None;
    }
    self.otp.input(index, text);
    self.advance().await
  }

  pub async fn type_char(&mut self, c: char) -> Option<PinEvent> {
    if self.step == PinStep::Closed {
      return None;
    }
    self.otp.type_char(c);
    self.advance().await
  }

  pub fn backspace(&mut self) {
    if self.step != PinStep::Closed {
      self.otp.backspace();
    }
  }

  async fn advance(&mut self) -> Option<PinEvent> {
    let pin = self.otp.code()?;
    self.otp.clear();

    let event = match self.step {
      PinStep::Closed => return None,
      PinStep::EnterNew => {
        self.candidate = Some(pin);
        self.step = PinStep::ConfirmNew;
        PinEvent::CandidateHeld
      }
      PinStep::ConfirmNew => self.confirm_new(pin).await,
      PinStep::ConfirmRemoval => self.confirm_removal(pin).await,
    };
    Some(event)
  }

  async fn confirm_new(&mut self, pin: Pin) -> PinEvent {
    if self.candidate.as_ref() != Some(&pin) {
      self.candidate = None;
      self.step = PinStep::EnterNew;
      self.notifier.error("PINs do not match");
      return PinEvent::Mismatch;
    }

    match self.secrets.set_secret(PIN_KEY, pin.as_str().to_owned()).await {
      Ok(()) => {
        self.set_pin_enabled(true);
        self.cancel();
        tracing::info!("PIN set");
        self.notifier.success("PIN set");
        PinEvent::Enabled
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to store PIN");
        self.candidate = None;
        self.step = PinStep::EnterNew;
        self.notifier.error("Could not save PIN");
        PinEvent::StorageFailed
      }
    }
  }

  async fn confirm_removal(&mut self, pin: Pin) -> PinEvent {
    let stored = match self.secrets.get_secret(PIN_KEY).await {
      Ok(stored) => stored,
      Err(e) => {
        tracing::error!(error = %e, "failed to read PIN");
        self.notifier.error("Could not check PIN");
        return PinEvent::StorageFailed;
      }
    };

    if !stored.as_deref().is_some_and(|s| pin.matches(s)) {
      self.notifier.error("Wrong PIN");
      return PinEvent::WrongPin;
    }

    match self.secrets.remove_secret(PIN_KEY).await {
      Ok(()) => {
        self.set_pin_enabled(false);
        self.cancel();
        tracing::info!("PIN removed");
        self.notifier.success("PIN removed");
        PinEvent::Disabled
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to remove PIN");
        self.notifier.error("Could not remove PIN");
        PinEvent::StorageFailed
      }
    }
  }
}
