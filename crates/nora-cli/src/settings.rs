//! Configuration file and environment layering.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Shape of the optional TOML config file. `NORA_*` environment variables
/// override it field by field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
  /// SQLite file backing the key-value store.
  pub data_path:    PathBuf,
  /// SQLite file holding the PIN, kept apart from the data.
  pub secrets_path: PathBuf,
}

impl Default for CliConfig {
  fn default() -> Self {
    Self {
      data_path:    PathBuf::from("~/.local/share/nora/nora.db"),
      secrets_path: PathBuf::from("~/.local/share/nora/secrets.db"),
    }
  }
}

impl CliConfig {
  /// Read `path` (if it exists) layered with the environment, then expand
  /// `~` in both paths.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let cfg: Self = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("NORA"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise CliConfig")?;

    Ok(Self {
      data_path:    expand_tilde(&cfg.data_path),
      secrets_path: expand_tilde(&cfg.secrets_path),
    })
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
