//! [`SubjectStore`] — the in-memory subject collection and its persistence.
//!
//! The whole collection is stored as one JSON array under
//! [`SUBJECTS_KEY`]. Every mutation builds the next collection, writes all of
//! it, and only then replaces the in-memory copy; a failed write leaves
//! memory as it was. Storage failures are logged and never propagated.

use std::sync::Arc;

use nora_core::{
  grade::{Grade, GradeCategory, parse_grade},
  store::{KeyValueStore, SUBJECTS_KEY},
  subject::{NewSubject, Subject, SubjectId},
  summary::{self, YearSummary},
};

use crate::{Error, Result};

/// Result of [`SubjectStore::update_grade`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradeUpdate {
  Updated { previous: Grade, value: Grade },
  SubjectNotFound,
  SlotOutOfRange,
  /// The change was valid but could not be written; nothing changed.
  NotPersisted,
}

pub struct SubjectStore<K: KeyValueStore> {
  kv:       Arc<K>,
  subjects: Vec<Subject>,
  loading:  bool,
}

impl<K: KeyValueStore> SubjectStore<K> {
  /// An empty store in the loading state. Call [`load`](Self::load) next.
  pub fn new(kv: Arc<K>) -> Self { Self { kv, subjects: Vec::new(), loading: true } }

  /// `true` until the first [`load`](Self::load) has finished.
  pub fn is_loading(&self) -> bool { self.loading }

  /// All subjects in insertion order.
  pub fn subjects(&self) -> &[Subject] { &self.subjects }

  pub fn get(&self, id: &SubjectId) -> Option<&Subject> {
    self.subjects.iter().find(|s| &s.id == id)
  }

  pub fn in_school_year<'a>(
    &'a self,
    year: &'a str,
  ) -> impl Iterator<Item = &'a Subject> + 'a {
    summary::in_school_year(&self.subjects, year)
  }

  pub fn school_years(&self) -> Vec<&str> { summary::school_years(&self.subjects) }

  pub fn summary(&self, year: &str) -> YearSummary { summary::summarize(&self.subjects, year) }

  // ── Persistence ─────────────────────────────────────────────────────────

  /// Hydrate from storage. Missing or unreadable data yields an empty
  /// collection.
  pub async fn load(&mut self) {
    self.subjects = match self.read().await {
      Ok(subjects) => {
        tracing::debug!(count = subjects.len(), "loaded subjects");
        subjects
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to load subjects; starting empty");
        Vec::new()
      }
    };
    self.loading = false;
  }

  async fn read(&self) -> Result<Vec<Subject>> {
    match self.kv.get(SUBJECTS_KEY).await.map_err(Error::store)? {
      Some(raw) => Ok(serde_json::from_str(&raw)?),
      None => Ok(Vec::new()),
    }
  }

  async fn persist(&mut self, next: Vec<Subject>) -> Result<()> {
    let raw = serde_json::to_string(&next)?;
    self.kv.set(SUBJECTS_KEY, raw).await.map_err(Error::store)?;
    self.subjects = next;
    Ok(())
  }

  // ── Mutations ───────────────────────────────────────────────────────────

  /// Append a subject with a fresh id and all slots unset.
  ///
  /// Does not validate the name or counts. Returns the stored record, or
  /// `None` if it could not be written.
  pub async fn add_subject(&mut self, draft: NewSubject) -> Option<Subject> {
    let subject = draft.into_subject(SubjectId::generate());
    let mut next = self.subjects.clone();
    next.push(subject.clone());

    match self.persist(next).await {
      Ok(()) => {
        tracing::debug!(id = %subject.id, name = %subject.name, "added subject");
        Some(subject)
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to save new subject");
        None
      }
    }
  }

  /// Set one grade slot from user input (see [`parse_grade`]).
  pub async fn update_grade(
    &mut self,
    id: &SubjectId,
    slot: usize,
    raw: &str,
    category: GradeCategory,
  ) -> GradeUpdate {
    let value = parse_grade(raw);
    if value.is_none() && !raw.trim().is_empty() {
      tracing::warn!(input = raw, "unparsable grade; clearing slot");
    }

    let Some(pos) = self.subjects.iter().position(|s| &s.id == id) else {
      tracing::debug!(%id, "grade update for unknown subject ignored");
      return GradeUpdate::SubjectNotFound;
    };

    let mut next = self.subjects.clone();
    let previous = match next[pos].set_grade(category, slot, value) {
      Ok(previous) => previous,
      Err(e) => {
        tracing::warn!(%id, error = %e, "grade update ignored");
        return GradeUpdate::SlotOutOfRange;
      }
    };

    match self.persist(next).await {
      Ok(()) => {
        tracing::debug!(%id, %category, slot, ?value, "updated grade");
        GradeUpdate::Updated { previous, value }
      }
      Err(e) => {
        tracing::error!(%id, error = %e, "failed to save grade");
        GradeUpdate::NotPersisted
      }
    }
  }

  /// Remove a subject. Returns `true` if one was removed and written.
  pub async fn delete_subject(&mut self, id: &SubjectId) -> bool {
    if self.get(id).is_none() {
      tracing::debug!(%id, "delete of unknown subject ignored");
      return false;
    }
    let next: Vec<Subject> =
      self.subjects.iter().filter(|s| &s.id != id).cloned().collect();

    match self.persist(next).await {
      Ok(()) => {
        tracing::debug!(%id, "deleted subject");
        true
      }
      Err(e) => {
        tracing::error!(%id, error = %e, "failed to delete subject");
        false
      }
    }
  }

  /// Remove the stored collection entirely and empty memory. Irreversible.
  pub async fn delete_all_data(&mut self) -> bool {
    match self.kv.remove(SUBJECTS_KEY).await {
      Ok(()) => {
        self.subjects.clear();
        tracing::info!("deleted all subject data");
        true
      }
      Err(e) => {
        tracing::error!(error = %e, "failed to delete all data");
        false
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use nora_core::memory::MemoryStore;

  use super::*;
  use crate::testing::FlakyStore;

  fn draft(name: &str, year: &str) -> NewSubject {
    NewSubject {
      accent_color: "#4f46e5".into(),
      exam_grade_count: 3,
      report_grade_count: 2,
      oral_grade_count: 1,
      ..NewSubject::new(name, year)
    }
  }

  async fn loaded(kv: Arc<MemoryStore>) -> SubjectStore<MemoryStore> {
    let mut store = SubjectStore::new(kv);
    store.load().await;
    store
  }

  // ─── Load ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn load_of_empty_storage_is_empty() {
    let mut store = SubjectStore::new(Arc::new(MemoryStore::new()));
    assert!(store.is_loading());
    store.load().await;
    assert!(!store.is_loading());
    assert!(store.subjects().is_empty());
  }

  #[tokio::test]
  async fn load_of_garbage_is_empty() {
    let kv = Arc::new(MemoryStore::new());
    kv.set(SUBJECTS_KEY, "{not json".into()).await.unwrap();
    let store = loaded(kv).await;
    assert!(store.subjects().is_empty());
    assert!(!store.is_loading());
  }

  #[tokio::test]
  async fn load_read_failure_is_empty() {
    let kv = Arc::new(FlakyStore::default());
    kv.fail_reads(true);
    let mut store = SubjectStore::new(kv);
    store.load().await;
    assert!(store.subjects().is_empty());
    assert!(!store.is_loading());
  }

  #[tokio::test]
  async fn load_sees_previous_writes() {
    let kv = Arc::new(MemoryStore::new());
    let mut first = loaded(kv.clone()).await;
    let added = first.add_subject(draft("Mathematik", "2025/26")).await.unwrap();

    let second = loaded(kv).await;
    assert_eq!(second.subjects(), &[added]);
  }

  // ─── Add ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn add_preserves_insertion_order_with_unique_ids() {
    let mut store = loaded(Arc::new(MemoryStore::new())).await;
    for name in ["Mathematik", "Deutsch", "Englisch", "Physik"] {
      store.add_subject(draft(name, "2025/26")).await.unwrap();
    }

    let names: Vec<_> = store.subjects().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Mathematik", "Deutsch", "Englisch", "Physik"]);

    let mut ids: Vec<_> = store.subjects().iter().map(|s| s.id.clone()).collect();
    ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    ids.dedup();
    assert_eq!(ids.len(), 4);
  }

  #[tokio::test]
  async fn add_creates_unset_slots_per_category() {
    let mut store = loaded(Arc::new(MemoryStore::new())).await;
    let s = store.add_subject(draft("Chemie", "2025/26")).await.unwrap();
    assert_eq!(s.exam_grades, vec![None; 3]);
    assert_eq!(s.report_grades, vec![None; 2]);
    assert_eq!(s.oral_grades, vec![None]);
  }

  #[tokio::test]
  async fn add_with_zero_counts_is_legal() {
    let mut store = loaded(Arc::new(MemoryStore::new())).await;
    let s = store
      .add_subject(NewSubject::new("Sport", "2025/26"))
      .await
      .unwrap();
    assert!(s.exam_grades.is_empty());
    assert!(s.report_grades.is_empty());
    assert!(s.oral_grades.is_empty());
  }

  #[tokio::test]
  async fn add_write_failure_leaves_memory_untouched() {
    let kv = Arc::new(FlakyStore::default());
    let mut store = SubjectStore::new(kv.clone());
    store.load().await;
    store.add_subject(draft("Mathematik", "2025/26")).await.unwrap();

    kv.fail_writes(true);
    assert!(store.add_subject(draft("Deutsch", "2025/26")).await.is_none());
    assert_eq!(store.subjects().len(), 1);
  }

  // ─── Update grade ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn update_grade_sets_one_slot_in_one_category() {
    let mut store = loaded(Arc::new(MemoryStore::new())).await;
    let s = store.add_subject(draft("Mathematik", "2025/26")).await.unwrap();

    let outcome = store.update_grade(&s.id, 1, "2", GradeCategory::Report).await;
    assert_eq!(outcome, GradeUpdate::Updated { previous: None, value: Some(2.0) });

    let s = store.get(&s.id).unwrap();
    assert_eq!(s.report_grades, vec![None, Some(2.0)]);
    assert_eq!(s.exam_grades, vec![None; 3]);
    assert_eq!(s.oral_grades, vec![None]);
  }

  #[tokio::test]
  async fn update_grade_empty_string_unsets() {
    let mut store = loaded(Arc::new(MemoryStore::new())).await;
    let s = store.add_subject(draft("Mathematik", "2025/26")).await.unwrap();
    store.update_grade(&s.id, 0, "1,3", GradeCategory::Exam).await;

    let outcome = store.update_grade(&s.id, 0, "", GradeCategory::Exam).await;
    assert_eq!(outcome, GradeUpdate::Updated { previous: Some(1.3), value: None });
    assert_eq!(store.get(&s.id).unwrap().exam_grades[0], None);
  }

  #[tokio::test]
  async fn update_grade_comma_equals_point() {
    let mut store = loaded(Arc::new(MemoryStore::new())).await;
    let s = store.add_subject(draft("Mathematik", "2025/26")).await.unwrap();
    store.update_grade(&s.id, 0, "2,5", GradeCategory::Exam).await;
    store.update_grade(&s.id, 1, "2.5", GradeCategory::Exam).await;

    let grades = &store.get(&s.id).unwrap().exam_grades;
    assert_eq!(grades[0], Some(2.5));
    assert_eq!(grades[0], grades[1]);
  }

  #[tokio::test]
  async fn update_grade_garbage_unsets() {
    let mut store = loaded(Arc::new(MemoryStore::new())).await;
    let s = store.add_subject(draft("Mathematik", "2025/26")).await.unwrap();
    store.update_grade(&s.id, 0, "1", GradeCategory::Oral).await;
    store.update_grade(&s.id, 0, "sehr gut", GradeCategory::Oral).await;
    assert_eq!(store.get(&s.id).unwrap().oral_grades, vec![None]);
  }

  #[tokio::test]
  async fn update_grade_unknown_subject_is_noop() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = loaded(kv.clone()).await;
    store.add_subject(draft("Mathematik", "2025/26")).await.unwrap();
    let before = kv.get(SUBJECTS_KEY).await.unwrap();

    let outcome = store
      .update_grade(&SubjectId::from("nope"), 0, "1", GradeCategory::Exam)
      .await;
    assert_eq!(outcome, GradeUpdate::SubjectNotFound);
    assert_eq!(kv.get(SUBJECTS_KEY).await.unwrap(), before);
  }

  #[tokio::test]
  async fn update_grade_out_of_range_is_rejected() {
    let mut store = loaded(Arc::new(MemoryStore::new())).await;
    let s = store.add_subject(draft("Mathematik", "2025/26")).await.unwrap();

    let outcome = store.update_grade(&s.id, 1, "1", GradeCategory::Oral).await;
    assert_eq!(outcome, GradeUpdate::SlotOutOfRange);
    assert_eq!(store.get(&s.id).unwrap().oral_grades, vec![None]);
  }

  #[tokio::test]
  async fn update_grade_persists_whole_collection() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = loaded(kv.clone()).await;
    let a = store.add_subject(draft("Mathematik", "2025/26")).await.unwrap();
    store.add_subject(draft("Deutsch", "2025/26")).await.unwrap();
    store.update_grade(&a.id, 2, "1", GradeCategory::Exam).await;

    let reloaded = loaded(kv).await;
    assert_eq!(reloaded.subjects(), store.subjects());
    assert_eq!(reloaded.subjects()[0].exam_grades[2], Some(1.0));
  }

  #[tokio::test]
  async fn update_grade_write_failure_is_reported() {
    let kv = Arc::new(FlakyStore::default());
    let mut store = SubjectStore::new(kv.clone());
    store.load().await;
    let s = store.add_subject(draft("Mathematik", "2025/26")).await.unwrap();

    kv.fail_writes(true);
    let outcome = store.update_grade(&s.id, 0, "1", GradeCategory::Exam).await;
    assert_eq!(outcome, GradeUpdate::NotPersisted);
    assert_eq!(store.get(&s.id).unwrap().exam_grades[0], None);
  }

  // ─── Delete ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_subject_twice_is_idempotent() {
    let mut store = loaded(Arc::new(MemoryStore::new())).await;
    let a = store.add_subject(draft("Mathematik", "2025/26")).await.unwrap();
    let b = store.add_subject(draft("Deutsch", "2025/26")).await.unwrap();

    assert!(store.delete_subject(&a.id).await);
    assert!(!store.delete_subject(&a.id).await);
    assert_eq!(store.subjects(), &[b]);
  }

  #[tokio::test]
  async fn delete_all_then_load_is_empty() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = loaded(kv.clone()).await;
    store.add_subject(draft("Mathematik", "2025/26")).await.unwrap();
    store.add_subject(draft("Deutsch", "2024/25")).await.unwrap();

    assert!(store.delete_all_data().await);
    assert!(store.subjects().is_empty());
    assert!(kv.get(SUBJECTS_KEY).await.unwrap().is_none());

    store.load().await;
    assert!(store.subjects().is_empty());
  }

  // ─── Views ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn school_year_filter_is_exact() {
    let mut store = loaded(Arc::new(MemoryStore::new())).await;
    store.add_subject(draft("Mathematik", "2025/26")).await.unwrap();
    store.add_subject(draft("Deutsch", "2024/25")).await.unwrap();
    store.add_subject(draft("Englisch", "2025-26")).await.unwrap();
    store.add_subject(draft("Physik", "2025/26")).await.unwrap();

    let names: Vec<_> = store.in_school_year("2025/26").map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Mathematik", "Physik"]);
    assert_eq!(store.school_years(), ["2025/26", "2024/25", "2025-26"]);
  }

  #[tokio::test]
  async fn summary_reflects_grades() {
    let mut store = loaded(Arc::new(MemoryStore::new())).await;
    let m = store.add_subject(draft("Mathematik", "2025/26")).await.unwrap();
    let d = store.add_subject(draft("Deutsch", "2025/26")).await.unwrap();
    store.update_grade(&m.id, 0, "1", GradeCategory::Exam).await;
    store.update_grade(&d.id, 0, "3", GradeCategory::Exam).await;

    let summary = store.summary("2025/26");
    assert_eq!(summary.subject_count, 2);
    assert_eq!(summary.average, Some(2.0));
    assert_eq!(summary.strongest, Some(("Mathematik".to_owned(), 1.0)));
  }
}
