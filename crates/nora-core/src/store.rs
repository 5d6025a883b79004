//! Collaborator traits for persistence.
//!
//! Two stores with the same shape: a plain key-value store for app data and
//! the session flag, and a hardened secret store used only for the PIN.
//! Values are opaque strings; callers own serialisation.

use std::future::Future;

/// Key holding the JSON array of all subjects.
pub const SUBJECTS_KEY: &str = "@grades_data_v1";

/// Key holding the JSON-encoded session token.
pub const SESSION_KEY: &str = "session";

/// Secret-store key holding the PIN.
pub const PIN_KEY: &str = "nora_user_pin";

/// The token written when a session is opened.
pub const SESSION_TOKEN: &str = "noraUser";

/// Persistent on-device key-value storage.
///
/// A single key's write is atomic; nothing spans keys.
pub trait KeyValueStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the value under `key`. `None` if absent.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Write `value` under `key`, replacing any previous value.
  fn set<'a>(
    &'a self,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete `key`. Deleting an absent key succeeds.
  fn remove<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// Platform-isolated secret storage. Same contract as [`KeyValueStore`].
pub trait SecretStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn get_secret<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  fn set_secret<'a>(
    &'a self,
    key: &'a str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn remove_secret<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
