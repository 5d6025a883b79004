//! Fixed-length digit entry with focus tracking.

use nora_core::pin::{PIN_LENGTH, Pin};

/// Six single-digit slots and the index of the focused slot.
///
/// Typing a digit fills the slot and moves focus forward. Backspace on a
/// filled slot clears it; backspace on an empty slot moves focus back without
/// clearing the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpBuffer {
  slots: [Option<char>; PIN_LENGTH],
  focus: usize,
}

impl OtpBuffer {
  pub fn new() -> Self { Self::default() }

  /// Replace slot `index` with the text typed into it.
  ///
  /// Non-digits are stripped first. Empty text clears the slot; text that
  /// still holds more than one digit (a paste) is ignored. Returns whether
  /// the buffer changed.
  pub fn input(&mut self, index: usize, text: &str) -> bool {
    if index >= PIN_LENGTH {
      return false;
    }
    let mut digits = text.chars().filter(char::is_ascii_digit);
    let digit = digits.next();
    if digits.next().is_some() {
      return false;
    }

    self.slots[index] = digit;
    self.focus = if digit.is_some() && index < PIN_LENGTH - 1 {
      index + 1
    } else {
      index
    };
    true
  }

  /// Type into the focused slot.
  pub fn type_char(&mut self, c: char) -> bool {
    let mut buf = [0u8; 4];
    self.input(self.focus, c.encode_utf8(&mut buf))
  }

  pub fn backspace(&mut self) {
    if self.slots[self.focus].is_some() {
      self.slots[self.focus] = None;
    } else if self.focus > 0 {
      self.focus -= 1;
    }
  }

  /// Empty every slot and focus the first.
  pub fn clear(&mut self) { *self = Self::default(); }

  pub fn focus(&self) -> usize { self.focus }

  pub fn filled(&self) -> usize { self.slots.iter().flatten().count() }

  pub fn is_complete(&self) -> bool { self.slots.iter().all(Option::is_some) }

  /// The entered code, once every slot holds a digit.
  pub fn code(&self) -> Option<Pin> {
    if !self.is_complete() {
      return None;
    }
    let raw: String = self.slots.iter().flatten().collect();
    Pin::parse(&raw).ok()
  }

  /// Masked rendering, e.g. `"●●●___"`.
  pub fn masked(&self) -> String {
    self
      .slots
      .iter()
      .map(|s| if s.is_some() { '●' } else { '_' })
      .collect()
  }
}
