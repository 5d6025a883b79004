//! School-year partitioning and per-year summaries.
//!
//! Grades use the German scale, where 1 is the best mark; the "strongest"
//! subject is therefore the one with the lowest average.

use crate::subject::Subject;

/// Subjects whose school year equals `year` exactly. No normalisation.
pub fn in_school_year<'a>(
  subjects: &'a [Subject],
  year: &'a str,
) -> impl Iterator<Item = &'a Subject> + 'a {
  subjects.iter().filter(move |s| s.school_year == year)
}

/// Distinct school-year labels in first-seen order.
pub fn school_years(subjects: &[Subject]) -> Vec<&str> {
  let mut years: Vec<&str> = Vec::new();
  for s in subjects {
    if !years.contains(&s.school_year.as_str()) {
      years.push(&s.school_year);
    }
  }
  years
}

/// Aggregate view of one school year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearSummary {
  pub school_year:   String,
  pub subject_count: usize,
  /// Mean of the subjects' overall averages; subjects without any grade are
  /// left out.
  pub average:       Option<f64>,
  /// Name and average of the subject with the best (lowest) average.
  pub strongest:     Option<(String, f64)>,
}

pub fn summarize(subjects: &[Subject], year: &str) -> YearSummary {
  let mut subject_count = 0;
  let mut graded: Vec<(&str, f64)> = Vec::new();

  for s in in_school_year(subjects, year) {
    subject_count += 1;
    if let Some(avg) = s.overall_average() {
      graded.push((s.name.as_str(), avg));
    }
  }

  let average = if graded.is_empty() {
    None
  } else {
    Some(graded.iter().map(|(_, a)| a).sum::<f64>() / graded.len() as f64)
  };

  // First subject wins ties, matching list order.
  let strongest = graded
    .iter()
    .fold(None::<(&str, f64)>, |best, &(name, avg)| match best {
      Some((_, b)) if b <= avg => best,
      _ => Some((name, avg)),
    })
    .map(|(name, avg)| (name.to_owned(), avg));

  YearSummary { school_year: year.to_owned(), subject_count, average, strongest }
}
