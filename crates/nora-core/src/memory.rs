//! [`MemoryStore`] — a process-local implementation of both storage traits.
//!
//! Data and secrets live in separate maps, mirroring the separation of the
//! real backends. Useful for tests and for running without a database.

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{Mutex, MutexGuard},
};

use crate::store::{KeyValueStore, SecretStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<String, String>>,
  secrets: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

// A poisoned map is still a valid map; keep going with its contents.
fn lock(m: &Mutex<HashMap<String, String>>) -> MutexGuard<'_, HashMap<String, String>> {
  m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl KeyValueStore for MemoryStore {
  type Error = Infallible;

  async fn get(&self, key: &str) -> Result<Option<String>, Infallible> {
    Ok(lock(&self.entries).get(key).cloned())
  }

  async fn set(&self, key: &str, value: String) -> Result<(), Infallible> {
    lock(&self.entries).insert(key.to_owned(), value);
    Ok(())
  }

  async fn remove(&self, key: &str) -> Result<(), Infallible> {
    lock(&self.entries).remove(key);
    Ok(())
  }
}

impl SecretStore for MemoryStore {
  type Error = Infallible;

  async fn get_secret(&self, key: &str) -> Result<Option<String>, Infallible> {
    Ok(lock(&self.secrets).get(key).cloned())
  }

  async fn set_secret(&self, key: &str, value: String) -> Result<(), Infallible> {
    lock(&self.secrets).insert(key.to_owned(), value);
    Ok(())
  }

  async fn remove_secret(&self, key: &str) -> Result<(), Infallible> {
    lock(&self.secrets).remove(key);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn data_and_secrets_are_separate() {
    let store = MemoryStore::new();
    store.set("k", "data".into()).await.unwrap();
    store.set_secret("k", "secret".into()).await.unwrap();

    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("data"));
    assert_eq!(store.get_secret("k").await.unwrap().as_deref(), Some("secret"));

    store.remove("k").await.unwrap();
    assert_eq!(store.get("k").await.unwrap(), None);
    assert!(store.get_secret("k").await.unwrap().is_some());
  }

  #[tokio::test]
  async fn removing_absent_key_succeeds() {
    let store = MemoryStore::new();
    store.remove("missing").await.unwrap();
    store.remove_secret("missing").await.unwrap();
  }
}
