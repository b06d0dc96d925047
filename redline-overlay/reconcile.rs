//! Merging chunk analysis results into the store.
//!
//! The analyzer works on contiguous text chunks, asynchronously, so its
//! results arrive as ordinary events and may be out of date by the time they
//! do. Reconciliation translates each chunk-local finding to document-global
//! offsets, rejects batches whose chunk was edited since the analysis was
//! requested, and swaps in the batch for exactly the annotations the same
//! chunk produced last time. Annotations owned by other chunks, or by nobody,
//! are never disturbed, so chunk-by-chunk re-analysis never flashes the whole
//! overlay.

use std::collections::HashSet;

use redline_core::{
  Annotation,
  AnnotationKind,
  AnnotationStatus,
  ChunkAttribution,
  ChunkBatch,
  Range,
};

use crate::store::AnnotationStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
  /// The batch was merged: `removed` superseded annotations from the same
  /// chunk went away, `added` new ones came in.
  Merged { added: usize, removed: usize },

  /// The batch was requested against a version whose text has since changed
  /// under the chunk (or is too old to check). Discarded, nothing changed.
  /// Expected under concurrent editing, not an error.
  Stale,
}

/// A candidate translated to current-document offsets, paired with the
/// chunk-local range it was reported at.
struct Translated {
  range:       Range,
  chunk_range: Range,
  index:       usize,
}

/// Merge one chunk batch into the store.
///
/// Ranges inside the batch are chunk-local and anchored to
/// `document_version_at_request`; they are lifted by `chunk_start` and then
/// replayed through every edit applied since that version. If any of those
/// edits touched the chunk's span the whole batch is stale and discarded.
///
/// Candidates whose final range fails the store invariant are skipped with a
/// warning; one bad candidate never aborts the rest of the batch.
pub fn reconcile(store: &mut AnnotationStore, batch: ChunkBatch) -> MergeOutcome {
  let Some(translated) = translate_batch(store, &batch) else {
    tracing::debug!(
      chunk = %batch.chunk_id.0,
      version_at_request = batch.document_version_at_request,
      version = store.version(),
      "discarding stale chunk batch"
    );
    return MergeOutcome::Stale;
  };

  let removed = store.remove_by_chunk(&batch.chunk_id);

  let mut seen: HashSet<(Range, AnnotationKind, &str)> = HashSet::new();
  let mut added = 0;
  for Translated {
    range,
    chunk_range,
    index,
  } in translated
  {
    let candidate = &batch.annotations[index];
    if !range.is_valid_for(store.doc_len()) {
      tracing::warn!(
        chunk = %batch.chunk_id.0,
        range = ?range,
        doc_len = store.doc_len(),
        "skipping chunk annotation with invalid range"
      );
      continue;
    }
    // within one batch, identical (range, kind, message) keeps the first
    if !seen.insert((range, candidate.kind, candidate.message.as_str())) {
      continue;
    }

    let id = store.mint_id();
    store.push(Annotation {
      id,
      range,
      kind: candidate.kind,
      message: candidate.message.clone(),
      suggestions: candidate.suggestions.clone(),
      chunk: Some(ChunkAttribution {
        chunk_id: batch.chunk_id.clone(),
        chunk_range,
      }),
      status: AnnotationStatus::Pending,
    });
    added += 1;
  }

  MergeOutcome::Merged { added, removed }
}

/// Lift the batch to document-global offsets at the *current* version, or
/// `None` if the batch is stale.
fn translate_batch(store: &AnnotationStore, batch: &ChunkBatch) -> Option<Vec<Translated>> {
  let edits = store.edits_since(batch.document_version_at_request)?;

  let mut span = batch.span();
  let mut candidates: Vec<Translated> = batch
    .annotations
    .iter()
    .enumerate()
    .map(|(index, candidate)| Translated {
      range:       candidate.range.translate(batch.chunk_start),
      chunk_range: candidate.range,
      index,
    })
    .collect();

  for edit in edits {
    if edit.touches(span) {
      return None;
    }
    span = edit.map_range(span)?;
    // the span was untouched, so everything inside it shifts rigidly; a
    // candidate that still drops (it lay outside the span) goes away alone
    candidates.retain_mut(|candidate| match edit.map_range(candidate.range) {
      Some(range) => {
        candidate.range = range;
        true
      },
      None => false,
    });
  }

  Some(candidates)
}
