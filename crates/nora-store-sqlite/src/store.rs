//! [`SqliteStore`] — the SQLite implementation of [`KeyValueStore`] and
//! [`SecretStore`].

use std::path::Path;

use nora_core::store::{KeyValueStore, SecretStore};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  schema::{SCHEMA, SCHEMA_VERSION},
};

// ─── Tables ──────────────────────────────────────────────────────────────────

/// The two tables share a shape; the table name is never user input.
#[derive(Clone, Copy)]
enum Table {
  Kv,
  Secrets,
}

impl Table {
  fn select(self) -> &'static str {
    match self {
      Table::Kv => "SELECT value FROM kv WHERE key = ?1",
      Table::Secrets => "SELECT value FROM secrets WHERE key = ?1",
    }
  }

  fn upsert(self) -> &'static str {
    match self {
      Table::Kv => {
        "INSERT INTO kv (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET
           value      = excluded.value,
           updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')"
      }
      Table::Secrets => {
        "INSERT INTO secrets (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value"
      }
    }
  }

  fn delete(self) -> &'static str {
    match self {
      Table::Kv => "DELETE FROM kv WHERE key = ?1",
      Table::Secrets => "DELETE FROM secrets WHERE key = ?1",
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A nora store backed by a single SQLite file.
///
/// One file can serve both traits; the CLI opens two files so the PIN lives
/// apart from the data. Cloning is cheap; the inner connection is
/// reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a throwaway in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let found: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
      })
      .await?;

    if found > SCHEMA_VERSION {
      return Err(Error::SchemaVersion { found, supported: SCHEMA_VERSION });
    }

    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!(version = SCHEMA_VERSION, "sqlite schema ready");
    Ok(())
  }

  async fn read(&self, table: Table, key: &str) -> Result<Option<String>> {
    let key = key.to_owned();
    let value: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(table.select(), rusqlite::params![key], |row| row.get(0))
            .optional()?,
        )
      })
      .await?;
    Ok(value)
  }

  async fn write(&self, table: Table, key: &str, value: String) -> Result<()> {
    let key = key.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(table.upsert(), rusqlite::params![key, value])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete(&self, table: Table, key: &str) -> Result<()> {
    let key = key.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(table.delete(), rusqlite::params![key])?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Trait impls ─────────────────────────────────────────────────────────────

impl KeyValueStore for SqliteStore {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<String>> {
    self.read(Table::Kv, key).await
  }

  async fn set(&self, key: &str, value: String) -> Result<()> {
    self.write(Table::Kv, key, value).await
  }

  async fn remove(&self, key: &str) -> Result<()> {
    self.delete(Table::Kv, key).await
  }
}

impl SecretStore for SqliteStore {
  type Error = Error;

  async fn get_secret(&self, key: &str) -> Result<Option<String>> {
    self.read(Table::Secrets, key).await
  }

  async fn set_secret(&self, key: &str, value: String) -> Result<()> {
    self.write(Table::Secrets, key, value).await
  }

  async fn remove_secret(&self, key: &str) -> Result<()> {
    self.delete(Table::Secrets, key).await
  }
}
