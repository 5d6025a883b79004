//! Collaborators shared by this crate's tests.

use std::sync::{
  Mutex,
  atomic::{AtomicBool, Ordering},
};

use nora_core::{
  memory::MemoryStore,
  notify::{Notifier, Severity, Toast},
  store::{KeyValueStore, SecretStore},
};

/// Remembers every notification it receives.
#[derive(Default)]
pub struct RecordingNotifier {
  toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
  pub fn last(&self) -> Option<(Severity, String)> {
    self
      .toasts
      .lock()
      .unwrap()
      .last()
      .map(|t| (t.severity, t.message.clone()))
  }

  pub fn count(&self) -> usize { self.toasts.lock().unwrap().len() }
}

impl Notifier for RecordingNotifier {
  fn notify(&self, toast: Toast) { self.toasts.lock().unwrap().push(toast); }
}

#[derive(Debug, thiserror::Error)]
#[error("injected storage failure")]
pub struct Injected;

/// A [`MemoryStore`] whose reads and writes can be made to fail.
#[derive(Default)]
pub struct FlakyStore {
  pub inner:       MemoryStore,
  pub fail_reads:  AtomicBool,
  pub fail_writes: AtomicBool,
}

impl FlakyStore {
  pub fn fail_reads(&self, on: bool) { self.fail_reads.store(on, Ordering::SeqCst); }

  pub fn fail_writes(&self, on: bool) { self.fail_writes.store(on, Ordering::SeqCst); }

  fn check(&self, flag: &AtomicBool) -> Result<(), Injected> {
    if flag.load(Ordering::SeqCst) { Err(Injected) } else { Ok(()) }
  }
}

impl KeyValueStore for FlakyStore {
  type Error = Injected;

  async fn get(&self, key: &str) -> Result<Option<String>, Injected> {
    self.check(&self.fail_reads)?;
    Ok(self.inner.get(key).await.unwrap_or_else(|e| match e {}))
  }

  async fn set(&self, key: &str, value: String) -> Result<(), Injected> {
    self.check(&self.fail_writes)?;
    self.inner.set(key, value).await.unwrap_or_else(|e| match e {});
    Ok(())
  }

  async fn remove(&self, key: &str) -> Result<(), Injected> {
    self.check(&self.fail_writes)?;
    self.inner.remove(key).await.unwrap_or_else(|e| match e {});
    Ok(())
  }
}

impl SecretStore for FlakyStore {
  type Error = Injected;

  async fn get_secret(&self, key: &str) -> Result<Option<String>, Injected> {
    self.check(&self.fail_reads)?;
    Ok(self.inner.get_secret(key).await.unwrap_or_else(|e| match e {}))
  }

  async fn set_secret(&self, key: &str, value: String) -> Result<(), Injected> {
    self.check(&self.fail_writes)?;
    self.inner.set_secret(key, value).await.unwrap_or_else(|e| match e {});
    Ok(())
  }

  async fn remove_secret(&self, key: &str) -> Result<(), Injected> {
    self.check(&self.fail_writes)?;
    self.inner.remove_secret(key).await.unwrap_or_else(|e| match e {});
    Ok(())
  }
}
