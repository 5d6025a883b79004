//! The six-digit PIN that optionally locks the app.

use std::fmt;

use crate::{Error, Result};

/// Number of digits in a PIN and of slots in an OTP buffer.
pub const PIN_LENGTH: usize = 6;

/// A validated PIN: exactly [`PIN_LENGTH`] ASCII digits.
#[derive(Clone, PartialEq, Eq)]
pub struct Pin(String);

impl Pin {
  pub fn parse(raw: &str) -> Result<Self> {
    if raw.len() == PIN_LENGTH && raw.bytes().all(|b| b.is_ascii_digit()) {
      Ok(Self(raw.to_owned()))
    } else {
      Err(Error::InvalidPin)
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }

  /// Compare against the raw value held by secret storage.
  pub fn matches(&self, stored: &str) -> bool { self.0 == stored }
}

// Never print the digits.
impl fmt::Debug for Pin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Pin(******)")
  }
}
