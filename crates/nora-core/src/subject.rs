//! Subject — a tracked course for one school year.
//!
//! A subject carries three independent grade categories. The number of slots
//! in each category is fixed when the subject is created; afterwards only the
//! values inside the slots change.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  grade::{Grade, GradeCategory, average},
};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque, immutable subject identifier.
///
/// New ids are UUID v4 text. Ids written by older versions are arbitrary short
/// strings, so the type does not insist on a UUID when loading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
  pub fn generate() -> Self { Self(Uuid::new_v4().to_string()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl From<String> for SubjectId {
  fn from(s: String) -> Self { Self(s) }
}

impl From<&str> for SubjectId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl fmt::Display for SubjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Subject ─────────────────────────────────────────────────────────────────

/// A persisted subject record.
///
/// Field names on the wire follow the storage format of earlier releases, so
/// existing collections keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
  #[serde(rename = "uuid")]
  pub id:                 SubjectId,
  /// Display name. Non-emptiness is checked by callers, not here.
  #[serde(rename = "subject")]
  pub name:               String,
  /// Academic period label, e.g. `"2025/26"`; compared by exact match only.
  #[serde(rename = "schoolyear")]
  pub school_year:        String,
  #[serde(rename = "accentColor")]
  pub accent_color:       String,

  #[serde(rename = "gradeAmount")]
  pub exam_grade_count:   usize,
  #[serde(rename = "grades")]
  pub exam_grades:        Vec<Grade>,

  #[serde(rename = "reportGradeAmount", default)]
  pub report_grade_count: usize,
  #[serde(rename = "reportGrades", default)]
  pub report_grades:      Vec<Grade>,

  #[serde(rename = "vocalGradeAmount", default)]
  pub oral_grade_count:   usize,
  #[serde(rename = "vocalGrades", default)]
  pub oral_grades:        Vec<Grade>,
}

impl Subject {
  /// The slots of one category.
  pub fn grades(&self, category: GradeCategory) -> &[Grade] {
    match category {
      GradeCategory::Exam => &self.exam_grades,
      GradeCategory::Report => &self.report_grades,
      GradeCategory::Oral => &self.oral_grades,
    }
  }

  /// Mutable access to the slots of one category. Handing out a slice rather
  /// than the `Vec` keeps the slot count fixed.
  fn grades_mut(&mut self, category: GradeCategory) -> &mut [Grade] {
    match category {
      GradeCategory::Exam => &mut self.exam_grades,
      GradeCategory::Report => &mut self.report_grades,
      GradeCategory::Oral => &mut self.oral_grades,
    }
  }

  /// The slot count declared at creation.
  pub fn grade_count(&self, category: GradeCategory) -> usize {
    match category {
      GradeCategory::Exam => self.exam_grade_count,
      GradeCategory::Report => self.report_grade_count,
      GradeCategory::Oral => self.oral_grade_count,
    }
  }

  /// Replace exactly one slot. Returns the previous value.
  pub fn set_grade(
    &mut self,
    category: GradeCategory,
    slot: usize,
    value: Grade,
  ) -> Result<Grade> {
    let grades = self.grades_mut(category);
    let len = grades.len();
    let target = grades
      .get_mut(slot)
      .ok_or(Error::SlotOutOfRange { category, slot, len })?;
    Ok(std::mem::replace(target, value))
  }

  /// Mean of the set slots in one category.
  pub fn average(&self, category: GradeCategory) -> Option<f64> {
    average(self.grades(category))
  }

  /// Mean over every set slot in all three categories.
  pub fn overall_average(&self) -> Option<f64> {
    let all: Vec<Grade> = self
      .exam_grades
      .iter()
      .chain(&self.report_grades)
      .chain(&self.oral_grades)
      .copied()
      .collect();
    average(&all)
  }
}

// ─── NewSubject ──────────────────────────────────────────────────────────────

/// Input to `SubjectStore::add_subject`: everything except the id, which the
/// store generates. A count of zero is legal and yields no slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubject {
  pub name:               String,
  pub school_year:        String,
  pub accent_color:       String,
  pub exam_grade_count:   usize,
  pub report_grade_count: usize,
  pub oral_grade_count:   usize,
}

impl NewSubject {
  /// Convenience constructor with no grade slots and no accent colour.
  pub fn new(name: impl Into<String>, school_year: impl Into<String>) -> Self {
    Self {
      name:               name.into(),
      school_year:        school_year.into(),
      accent_color:       String::new(),
      exam_grade_count:   0,
      report_grade_count: 0,
      oral_grade_count:   0,
    }
  }

  /// Materialise the record with all slots unset.
  pub fn into_subject(self, id: SubjectId) -> Subject {
    Subject {
      id,
      name: self.name,
      school_year: self.school_year,
      accent_color: self.accent_color,
      exam_grade_count: self.exam_grade_count,
      exam_grades: vec![None; self.exam_grade_count],
      report_grade_count: self.report_grade_count,
      report_grades: vec![None; self.report_grade_count],
      oral_grade_count: self.oral_grade_count,
      oral_grades: vec![None; self.oral_grade_count],
    }
  }
}
