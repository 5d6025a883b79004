//! Plain-text formatting of subjects, summaries and notifications.

use nora_app::toast::{ActiveToast, ToastSlot};
use nora_core::{
  grade::{Grade, GradeCategory},
  subject::Subject,
  summary::YearSummary,
};
use strum::IntoEnumIterator;

pub fn grade(g: Grade) -> String {
  match g {
    Some(v) => format!("{v}"),
    None => "-".to_owned(),
  }
}

pub fn average(avg: Option<f64>) -> String {
  match avg {
    Some(v) => format!("{v:.2}"),
    None => "-".to_owned(),
  }
}

/// One header line, then one line per category that has slots.
pub fn subject(s: &Subject) -> String {
  let mut out = format!(
    "{}  {} ({})  avg {}",
    s.id,
    s.name,
    s.school_year,
    average(s.overall_average())
  );
  for category in GradeCategory::iter() {
    let slots = s.grades(category);
    if slots.is_empty() {
      continue;
    }
    let label: &'static str = category.into();
    let cells: Vec<String> = slots.iter().copied().map(grade).collect();
    out.push_str(&format!(
      "\n  {:<7}{}  avg {}",
      format!("{label}:"),
      cells.join(" "),
      average(s.average(category))
    ));
  }
  out
}

pub fn summary(s: &YearSummary) -> String {
  let mut out = format!(
    "{}: {} subject{}, average {}",
    s.school_year,
    s.subject_count,
    if s.subject_count == 1 { "" } else { "s" },
    average(s.average)
  );
  if let Some((name, avg)) = &s.strongest {
    out.push_str(&format!(", strongest {name} ({avg:.2})"));
  }
  out
}

pub fn toast(active: &ActiveToast) -> String {
  format!("[{}] {}", active.toast.severity, active.toast.message)
}

/// Print and clear the visible notification, if any.
pub fn flush(toasts: &ToastSlot) {
  if let Some(active) = toasts.dismiss() {
    eprintln!("{}", toast(&active));
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use nora_core::{
    notify::{Severity, Toast},
    subject::{NewSubject, SubjectId},
  };

  use super::*;

  fn maths() -> Subject {
    let mut s = NewSubject {
      exam_grade_count: 3,
      oral_grade_count: 1,
      ..NewSubject::new("Maths", "2025/26")
    }
    .into_subject(SubjectId::from("m1"));
    s.set_grade(GradeCategory::Exam, 0, Some(2.0)).unwrap();
    s.set_grade(GradeCategory::Exam, 2, Some(2.5)).unwrap();
    s
  }

  #[test]
  fn unset_grades_render_as_dash() {
    assert_eq!(grade(None), "-");
    assert_eq!(grade(Some(2.5)), "2.5");
    assert_eq!(average(None), "-");
    assert_eq!(average(Some(2.25)), "2.25");
  }

  #[test]
  fn subject_skips_empty_categories() {
    let out = subject(&maths());
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "m1  Maths (2025/26)  avg 2.25");
    assert_eq!(lines[1], "  exam:  2 - 2.5  avg 2.25");
    assert_eq!(lines[2], "  oral:  -  avg -");
  }

  #[test]
  fn summary_names_strongest() {
    let s = YearSummary {
      school_year:   "2025/26".into(),
      subject_count: 2,
      average:       Some(2.0),
      strongest:     Some(("Art".into(), 1.5)),
    };
    assert_eq!(
      summary(&s),
      "2025/26: 2 subjects, average 2.00, strongest Art (1.50)"
    );
  }

  #[test]
  fn flush_empties_the_slot() {
    let slot = ToastSlot::new();
    slot.show_at(Toast::new("PIN set", Severity::Success), Utc::now());
    assert_eq!(toast(&slot.current().unwrap()), "[success] PIN set");
    flush(&slot);
    assert!(slot.current().is_none());
  }
}
