//! [`SessionGate`] — sign-in state and the login PIN entry.
//!
//! ```text
//! CheckingStorage ─┬─ session stored ──────────────▶ Authenticated
//!                  ├─ no PIN ──────────────────────▶ AutoAuthenticated
//!                  └─ PIN set ─▶ AwaitingPinEntry ─▶ Authenticated
//! ```
//!
//! While awaiting entry, digits go into an [`OtpBuffer`]. The moment all six
//! slots are filled the code is compared with the stored PIN. A mismatch
//! clears the buffer; attempts are unlimited.

use std::sync::{
  Arc,
  atomic::{AtomicBool, Ordering},
};

use nora_core::{
  notify::Notifier,
  pin::Pin,
  store::{KeyValueStore, PIN_KEY, SESSION_KEY, SESSION_TOKEN, SecretStore},
};

use crate::{Error, Result, otp::OtpBuffer, settings::PinSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
  CheckingStorage,
  /// Signed in without a PIN because none is configured.
  AutoAuthenticated,
  AwaitingPinEntry,
  Authenticated,
}

impl SessionState {
  pub fn is_authenticated(self) -> bool {
    matches!(self, Self::AutoAuthenticated | Self::Authenticated)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
  Accepted,
  Rejected,
}

pub struct SessionGate<K, S, N>
where
  K: KeyValueStore,
  S: SecretStore,
  N: Notifier,
{
  kv:          Arc<K>,
  secrets:     Arc<S>,
  notifier:    Arc<N>,
  state:       SessionState,
  pin_enabled: Arc<AtomicBool>,
  otp:         OtpBuffer,
}

impl<K, S, N> SessionGate<K, S, N>
where
  K: KeyValueStore,
  S: SecretStore,
  N: Notifier,
{
  pub fn new(kv: Arc<K>, secrets: Arc<S>, notifier: Arc<N>) -> Self {
    Self {
      kv,
      secrets,
      notifier,
      state: SessionState::CheckingStorage,
      pin_enabled: Arc::default(),
      otp: OtpBuffer::new(),
    }
  }

  pub fn state(&self) -> SessionState { self.state }

  pub fn is_authenticated(&self) -> bool { self.state.is_authenticated() }

  /// Whether a PIN was configured when storage was last checked.
  pub fn pin_enabled(&self) -> bool { self.pin_enabled.load(Ordering::SeqCst) }

  fn set_pin_enabled(&self, enabled: bool) { self.pin_enabled.store(enabled, Ordering::SeqCst); }

  /// The PIN settings flow for this session. Enabling or removing the PIN
  /// there is reflected in [`pin_enabled`](Self::pin_enabled).
  pub fn pin_settings(&self) -> PinSettings<S, N> {
    PinSettings::sharing(
      self.secrets.clone(),
      self.notifier.clone(),
      self.pin_enabled.clone(),
    )
  }

  pub fn otp(&self) -> &OtpBuffer { &self.otp }

  // ── Boot / sign-out ─────────────────────────────────────────────────────

  /// Derive the session state from storage.
  ///
  /// A stored session token signs in directly. Otherwise the PIN decides:
  /// none configured signs in automatically, one configured requires entry.
  pub async fn boot(&mut self) {
    self.state = SessionState::CheckingStorage;

    let token = self.read_session().await.unwrap_or_else(|e| {
      tracing::error!(error = %e, "failed to read session; treating as signed out");
      None
    });

    if token.is_some() {
      let enabled = self.pin_configured().await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to check PIN status");
        false
      });
      self.set_pin_enabled(enabled);
      self.state = SessionState::Authenticated;
      tracing::debug!("session restored");
      return;
    }

    self.resolve_signed_out().await;
  }

  /// Clear the session, then gate again as on boot.
  pub async fn sign_out(&mut self) {
    if let Err(e) = self.kv.remove(SESSION_KEY).await {
      tracing::error!(error = %e, "failed to clear session");
    }
    tracing::info!("signed out");
    self.resolve_signed_out().await;
  }

  async fn resolve_signed_out(&mut self) {
    self.state = SessionState::CheckingStorage;
    self.otp.clear();

    match self.pin_configured().await {
      Ok(false) => {
        self.set_pin_enabled(false);
        self.open_session().await;
        self.state = SessionState::AutoAuthenticated;
        self.notifier.success("Signed in automatically");
      }
      Ok(true) => {
        self.set_pin_enabled(true);
        self.state = SessionState::AwaitingPinEntry;
      }
      // Fail closed: without knowing whether a PIN exists, ask for it.
      Err(e) => {
        tracing::error!(error = %e, "failed to check PIN status");
        self.notifier.error("Could not check PIN status");
        self.state = SessionState::AwaitingPinEntry;
      }
    }
  }

  // ── PIN entry ───────────────────────────────────────────────────────────

  /// Text typed into slot `index`. Submits automatically once all slots are
  /// filled.
  pub async fn input(&mut self, index: usize, text: &str) -> Option<LoginOutcome> {
    if self.state != SessionState::AwaitingPinEntry {
      return None;
    }
    self.otp.input(index, text);
    self.submit().await
  }

  /// A character typed into the focused slot.
  pub async fn type_char(&mut self, c: char) -> Option<LoginOutcome> {
    if self.state != SessionState::AwaitingPinEntry {
      return None;
    }
    self.otp.type_char(c);
    self.submit().await
  }

  pub fn backspace(&mut self) {
    if self.state == SessionState::AwaitingPinEntry {
      self.otp.backspace();
    }
  }

  /// Verify the buffer against the stored PIN. `None` while incomplete or
  /// when not awaiting entry.
  pub async fn submit(&mut self) -> Option<LoginOutcome> {
    if self.state != SessionState::AwaitingPinEntry {
      return None;
    }
    let code = self.otp.code()?;
    Some(self.verify(&code).await)
  }

  async fn verify(&mut self, code: &Pin) -> LoginOutcome {
    match self.secrets.get_secret(PIN_KEY).await {
      Ok(Some(stored)) if code.matches(&stored) => {
        self.otp.clear();
        self.open_session().await;
        self.state = SessionState::Authenticated;
        self.set_pin_enabled(true);
        tracing::info!("PIN accepted");
        self.notifier.success("Welcome!");
        LoginOutcome::Accepted
      }
      Ok(_) => {
        self.otp.clear();
        tracing::debug!("PIN rejected");
        self.notifier.error("Wrong code");
        LoginOutcome::Rejected
      }
      Err(e) => {
        self.otp.clear();
        tracing::error!(error = %e, "failed to read PIN");
        self.notifier.error("Login failed");
        LoginOutcome::Rejected
      }
    }
  }

  // ── Storage ─────────────────────────────────────────────────────────────

  async fn read_session(&self) -> Result<Option<String>> {
    match self.kv.get(SESSION_KEY).await.map_err(Error::store)? {
      Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
      None => Ok(None),
    }
  }

  /// Persist the session token. In-memory state proceeds even if the write
  /// fails; the session is then simply not restored on next boot.
  async fn open_session(&self) {
    if let Err(e) = self.write_session().await {
      tracing::error!(error = %e, "failed to store session");
    }
  }

  async fn write_session(&self) -> Result<()> {
    let raw = serde_json::to_string(SESSION_TOKEN)?;
    self.kv.set(SESSION_KEY, raw).await.map_err(Error::store)
  }

  async fn pin_configured(&self) -> Result<bool> {
    let pin = self.secrets.get_secret(PIN_KEY).await.map_err(Error::store)?;
    Ok(pin.is_some())
  }

  /// Re-read whether a PIN is configured, e.g. after the settings flow.
  pub async fn refresh_pin_status(&mut self) {
    match self.pin_configured().await {
      Ok(enabled) => self.set_pin_enabled(enabled),
      Err(e) => tracing::error!(error = %e, "failed to check PIN status"),
    }
  }
}
