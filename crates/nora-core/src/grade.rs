//! Grade values, grade categories, and user-input parsing.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// A single grade slot: a numeric grade, or `None` when unset.
///
/// Unset slots serialise as JSON `null`.
pub type Grade = Option<f64>;

/// The three independent grade categories a subject tracks.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GradeCategory {
  /// Written exams.
  Exam,
  /// Report-card grades.
  Report,
  /// Oral participation.
  Oral,
}

/// Parse a grade as typed by the user.
///
/// Empty (or all-whitespace) input clears the slot. A decimal comma is
/// accepted in place of a decimal point (`"2,5"` == `"2.5"`). Anything that
/// does not parse as a finite number also clears the slot.
pub fn parse_grade(raw: &str) -> Grade {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }
  trimmed
    .replacen(',', ".", 1)
    .parse::<f64>()
    .ok()
    .filter(|g| g.is_finite())
}

/// Arithmetic mean of the set slots. `None` if no slot is set.
pub fn average(grades: &[Grade]) -> Option<f64> {
  let set: Vec<f64> = grades.iter().flatten().copied().collect();
  if set.is_empty() {
    None
  } else {
    Some(set.iter().sum::<f64>() / set.len() as f64)
  }
}
