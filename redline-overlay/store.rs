//! The per-document annotation store: single owner of the current annotation
//! set, the document version counter, and the bounded window of recent edits
//! the reconciler replays late analysis results through.

use std::collections::VecDeque;

use redline_core::{
  Annotation,
  AnnotationId,
  ChunkId,
  Range,
};

use crate::edit::{
  Edit,
  Result,
};

pub const DEFAULT_EDIT_HISTORY_LIMIT: usize = 64;

/// One per open document instance, in-memory only, destroyed with the
/// document.
#[derive(Debug, Clone)]
pub struct AnnotationStore {
  annotations:   Vec<Annotation>,
  version:       u64,
  doc_len:       usize,
  /// Recent edits, each tagged with the version it produced. Oldest first.
  history:       VecDeque<(u64, Edit)>,
  history_limit: usize,
  next_id:       u64,
}

impl AnnotationStore {
  #[must_use]
  pub fn new(doc_len: usize) -> Self {
    Self::with_history_limit(doc_len, DEFAULT_EDIT_HISTORY_LIMIT)
  }

  #[must_use]
  pub fn with_history_limit(doc_len: usize, history_limit: usize) -> Self {
    Self {
      annotations: Vec::new(),
      version: 0,
      doc_len,
      history: VecDeque::new(),
      history_limit: history_limit.max(1),
      next_id: 1,
    }
  }

  pub fn version(&self) -> u64 {
    self.version
  }

  pub fn doc_len(&self) -> usize {
    self.doc_len
  }

  pub fn len(&self) -> usize {
    self.annotations.len()
  }

  pub fn is_empty(&self) -> bool {
    self.annotations.is_empty()
  }

  pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
    self.annotations.iter().find(|a| a.id == id)
  }

  pub(crate) fn get_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
    self.annotations.iter_mut().find(|a| a.id == id)
  }

  /// All stored annotations in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
    self.annotations.iter()
  }

  /// Annotations whose range intersects `range`, in insertion order. Pure
  /// read; the rendering layer calls this on every paint.
  pub fn query(&self, range: Range) -> impl Iterator<Item = &Annotation> {
    self
      .annotations
      .iter()
      .filter(move |a| a.range.intersects(&range))
  }

  /// Atomically replace the whole annotation set (full-document reanalysis).
  /// Consumers must treat this as a full refresh; no per-item diff is
  /// emitted. Annotations violating the range invariant are skipped.
  pub fn replace_all(&mut self, annotations: Vec<Annotation>) {
    self.annotations.clear();
    for annotation in annotations {
      if !annotation.range.is_valid_for(self.doc_len) {
        tracing::warn!(
          id = annotation.id.0,
          range = ?annotation.range,
          doc_len = self.doc_len,
          "skipping annotation with invalid range in replace_all"
        );
        continue;
      }
      // keep id minting monotonic past any caller-assigned ids
      self.next_id = self.next_id.max(annotation.id.0 + 1);
      self.annotations.push(annotation);
    }
  }

  /// Remove every annotation and the edit window. The version counter keeps
  /// counting so results requested before the clear stay rejectable.
  pub fn clear(&mut self) {
    self.annotations.clear();
    self.history.clear();
  }

  /// Apply one edit: validate it whole, bump the version, remap every stored
  /// annotation, and record the edit in the history window. Annotations whose
  /// remapped range is consumed (or no longer valid) are removed; survivors
  /// keep their insertion order.
  ///
  /// A malformed edit leaves the store untouched. An empty edit is a no-op
  /// and does not bump the version.
  pub fn apply_edit(&mut self, edit: &Edit) -> Result<()> {
    let len_after = edit.validate(self.doc_len)?;
    if edit.is_empty() {
      return Ok(());
    }

    self
      .annotations
      .retain_mut(|annotation| match edit.map_range(annotation.range) {
        Some(range) if range.is_valid_for(len_after) => {
          annotation.range = range;
          true
        },
        _ => false,
      });

    self.version += 1;
    self.doc_len = len_after;
    self.history.push_back((self.version, edit.clone()));
    while self.history.len() > self.history_limit {
      self.history.pop_front();
    }

    Ok(())
  }

  /// The edits applied since the document was at `version`, oldest first, or
  /// `None` when the history window no longer reaches back that far (callers
  /// then treat anything anchored to `version` as stale). A `version` ahead
  /// of the store is unanswerable and also yields `None`.
  pub fn edits_since(&self, version: u64) -> Option<Vec<&Edit>> {
    if version > self.version {
      return None;
    }
    if version == self.version {
      return Some(Vec::new());
    }
    // the oldest retained entry moved the document from `v - 1` to `v`
    let oldest = self.history.front().map(|(v, _)| *v)?;
    if version + 1 < oldest {
      return None;
    }
    Some(
      self
        .history
        .iter()
        .filter(|(v, _)| *v > version)
        .map(|(_, edit)| edit)
        .collect(),
    )
  }

  pub(crate) fn mint_id(&mut self) -> AnnotationId {
    let id = AnnotationId(self.next_id);
    self.next_id += 1;
    id
  }

  pub(crate) fn push(&mut self, annotation: Annotation) {
    self.annotations.push(annotation);
  }

  /// Remove every annotation attributed to `chunk_id`, returning how many
  /// were removed. Annotations from other chunks, or with no chunk
  /// attribution, are never touched.
  pub(crate) fn remove_by_chunk(&mut self, chunk_id: &ChunkId) -> usize {
    let before = self.annotations.len();
    self
      .annotations
      .retain(|a| a.chunk.as_ref().is_none_or(|c| &c.chunk_id != chunk_id));
    before - self.annotations.len()
  }
}

#[cfg(test)]
mod tests {
  use redline_core::{
    AnnotationKind,
    AnnotationStatus,
    ChunkAttribution,
  };

  use super::*;
  use crate::edit::EditError;

  fn annotation(id: u64, start: usize, end: usize) -> Annotation {
    Annotation {
      id:          AnnotationId(id),
      range:       Range::new(start, end),
      kind:        AnnotationKind::Grammar,
      message:     "test".into(),
      suggestions: Vec::new(),
      chunk:       None,
      status:      AnnotationStatus::Pending,
    }
  }

  #[test]
  fn empty_edit_is_a_noop() {
    let mut store = AnnotationStore::new(20);
    store.replace_all(vec![annotation(1, 3, 8), annotation(2, 10, 15)]);
    let before = store.clone();

    store.apply_edit(&Edit::new(20)).unwrap();

    assert_eq!(store.version(), before.version());
    assert_eq!(
      store.iter().collect::<Vec<_>>(),
      before.iter().collect::<Vec<_>>()
    );
  }

  #[test]
  fn edit_remaps_and_drops() {
    let mut store = AnnotationStore::new(20);
    store.replace_all(vec![annotation(1, 3, 8), annotation(2, 10, 15)]);

    // delete [9, 16) swallows the second annotation entirely
    store.apply_edit(&Edit::new(20).with_delete(9, 7)).unwrap();

    assert_eq!(store.version(), 1);
    assert_eq!(store.doc_len(), 13);
    let ranges: Vec<_> = store.iter().map(|a| a.range).collect();
    assert_eq!(ranges, vec![Range::new(3, 8)]);
  }

  #[test]
  fn survivors_keep_insertion_order() {
    let mut store = AnnotationStore::new(30);
    store.replace_all(vec![
      annotation(1, 20, 25),
      annotation(2, 0, 5),
      annotation(3, 10, 15),
    ]);

    store.apply_edit(&Edit::new(30).with_insert(7, 3)).unwrap();

    let ids: Vec<_> = store.iter().map(|a| a.id.0).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    let ranges: Vec<_> = store.iter().map(|a| a.range).collect();
    assert_eq!(ranges, vec![
      Range::new(23, 28),
      Range::new(0, 5),
      Range::new(13, 18),
    ]);
  }

  #[test]
  fn malformed_edit_leaves_store_unchanged() {
    let mut store = AnnotationStore::new(10);
    store.replace_all(vec![annotation(1, 2, 6)]);

    let err = store
      .apply_edit(&Edit::new(10).with_delete(4, 2).with_insert(20, 1))
      .unwrap_err();
    assert!(matches!(err, EditError::InsertOutOfBounds { .. }));

    assert_eq!(store.version(), 0);
    assert_eq!(store.doc_len(), 10);
    assert_eq!(store.get(AnnotationId(1)).unwrap().range, Range::new(2, 6));
  }

  #[test]
  fn replace_all_skips_invalid_ranges() {
    let mut store = AnnotationStore::new(10);
    store.replace_all(vec![
      annotation(1, 2, 6),
      annotation(2, 8, 12), // past the end
      annotation(3, 4, 4),  // empty
    ]);
    assert_eq!(store.len(), 1);
    assert!(store.get(AnnotationId(1)).is_some());
  }

  #[test]
  fn query_is_intersection_only() {
    let mut store = AnnotationStore::new(30);
    store.replace_all(vec![annotation(1, 0, 5), annotation(2, 10, 20)]);

    let hits: Vec<_> = store.query(Range::new(4, 11)).map(|a| a.id.0).collect();
    assert_eq!(hits, vec![1, 2]);

    // half-open: a query ending exactly at a start is not a hit
    let hits: Vec<_> = store.query(Range::new(5, 10)).map(|a| a.id.0).collect();
    assert!(hits.is_empty());
  }

  #[test]
  fn edits_since_replays_in_order() {
    let mut store = AnnotationStore::new(10);
    let first = Edit::new(10).with_insert(0, 2);
    let second = Edit::new(12).with_delete(5, 1);
    store.apply_edit(&first).unwrap();
    store.apply_edit(&second).unwrap();

    assert_eq!(store.edits_since(2), Some(Vec::new()));
    assert_eq!(store.edits_since(1), Some(vec![&second]));
    assert_eq!(store.edits_since(0), Some(vec![&first, &second]));
    assert_eq!(store.edits_since(3), None);
  }

  #[test]
  fn edits_since_respects_history_window() {
    let mut store = AnnotationStore::with_history_limit(100, 2);
    let mut len = 100;
    for _ in 0..3 {
      store.apply_edit(&Edit::new(len).with_insert(0, 1)).unwrap();
      len += 1;
    }
    assert_eq!(store.version(), 3);
    // window of 2 holds the edits producing versions 2 and 3
    assert!(store.edits_since(1).is_some());
    assert_eq!(store.edits_since(1).unwrap().len(), 2);
    assert_eq!(store.edits_since(0), None);
  }

  #[test]
  fn remove_by_chunk_ignores_other_chunks() {
    let mut store = AnnotationStore::new(30);
    let mut from_a = annotation(1, 0, 5);
    from_a.chunk = Some(ChunkAttribution {
      chunk_id:    "a".into(),
      chunk_range: Range::new(0, 5),
    });
    let mut from_b = annotation(2, 3, 9);
    from_b.chunk = Some(ChunkAttribution {
      chunk_id:    "b".into(),
      chunk_range: Range::new(3, 9),
    });
    store.replace_all(vec![from_a, from_b, annotation(3, 4, 8)]);

    assert_eq!(store.remove_by_chunk(&"a".into()), 1);
    let ids: Vec<_> = store.iter().map(|a| a.id.0).collect();
    assert_eq!(ids, vec![2, 3]);
  }

  #[test]
  fn minted_ids_stay_unique_after_replace_all() {
    let mut store = AnnotationStore::new(10);
    store.replace_all(vec![annotation(7, 0, 3)]);
    assert_eq!(store.mint_id(), AnnotationId(8));
    assert_eq!(store.mint_id(), AnnotationId(9));
  }
}
