//! Error types for `nora-core`.

use thiserror::Error;

use crate::{grade::GradeCategory, pin::PIN_LENGTH};

#[derive(Debug, Error)]
pub enum Error {
  #[error("slot {slot} is out of range for {category} grades ({len} slots)")]
  SlotOutOfRange {
    category: GradeCategory,
    slot:     usize,
    len:      usize,
  },

  #[error("a PIN must be exactly {} digits", PIN_LENGTH)]
  InvalidPin,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
