//! The event-driven front door of the overlay.
//!
//! The host editing surface drives the overlay with a single ordered stream
//! of [`OverlayEvent`]s: edits, analysis results, user verdicts, composition
//! state, and the final clear. Events apply strictly in arrival order and
//! every event either completes or leaves the store unchanged, so a query
//! between events always sees a consistent overlay.
//!
//! There is no registration, no global state, and no metadata smuggled on
//! edit payloads: an [`OverlayEngine`] is a plain constructed object the host
//! wires in per open document, and analysis results are their own event.
//!
//! While the host reports an active input-method composition session,
//! [`OverlayEngine::view`] returns nothing. Suppression is purely read-side;
//! the store keeps remapping underneath and reappears intact when the
//! composition session ends.

use redline_core::{
  Annotation,
  AnnotationId,
  ChunkBatch,
  Outcome,
  Range,
};

use crate::{
  Result,
  edit::Edit,
  lifecycle::{
    FeedbackEvent,
    LifecycleManager,
  },
  reconcile::{
    MergeOutcome,
    reconcile,
  },
  store::AnnotationStore,
};

/// One discrete input from the host, applied in arrival order.
#[derive(Debug, Clone)]
pub enum OverlayEvent {
  /// The user or a program changed the text.
  Edit(Edit),

  /// An asynchronous chunk analysis result arrived.
  Analysis(ChunkBatch),

  /// The user accepted or rejected an annotation.
  Resolve { id: AnnotationId, outcome: Outcome },

  /// The input method entered or left a composition session.
  Composition(bool),

  /// The overlay is done (document closed); drop everything.
  Clear,
}

/// What handling one event produced, for the host to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
  /// The edit applied; the store is now at this version.
  EditApplied { version: u64 },

  /// The batch merged or was discarded as stale.
  Analysis(MergeOutcome),

  /// Forward this to feedback persistence (at-least-once; the collaborator
  /// deduplicates replays).
  Resolved(FeedbackEvent),

  Composition { active: bool },

  Cleared,
}

#[derive(Debug, Clone)]
pub struct OverlayEngine {
  store:     AnnotationStore,
  lifecycle: LifecycleManager,
  composing: bool,
}

impl OverlayEngine {
  #[must_use]
  pub fn new(user_id: impl Into<String>, document_id: impl Into<String>, doc_len: usize) -> Self {
    Self {
      store:     AnnotationStore::new(doc_len),
      lifecycle: LifecycleManager::new(user_id, document_id),
      composing: false,
    }
  }

  pub fn store(&self) -> &AnnotationStore {
    &self.store
  }

  pub fn is_composing(&self) -> bool {
    self.composing
  }

  /// Apply one event. Errors are local: a malformed edit or an unknown
  /// annotation id leaves the overlay exactly as it was.
  pub fn handle(&mut self, event: OverlayEvent) -> Result<Dispatch> {
    match event {
      OverlayEvent::Edit(edit) => {
        self.store.apply_edit(&edit)?;
        Ok(Dispatch::EditApplied {
          version: self.store.version(),
        })
      },
      OverlayEvent::Analysis(batch) => {
        let outcome = reconcile(&mut self.store, batch);
        Ok(Dispatch::Analysis(outcome))
      },
      OverlayEvent::Resolve { id, outcome } => {
        let event = self.lifecycle.resolve(&mut self.store, id, outcome)?;
        Ok(Dispatch::Resolved(event))
      },
      OverlayEvent::Composition(active) => {
        self.composing = active;
        Ok(Dispatch::Composition { active })
      },
      OverlayEvent::Clear => {
        self.store.clear();
        Ok(Dispatch::Cleared)
      },
    }
  }

  /// The annotations to render over `range`. Empty while a composition
  /// session is active, regardless of what the store holds.
  pub fn view(&self, range: Range) -> Vec<&Annotation> {
    if self.composing {
      return Vec::new();
    }
    self.store.query(range).collect()
  }
}

#[cfg(test)]
mod tests {
  use redline_core::{
    AnnotationKind,
    CandidateAnnotation,
  };

  use super::*;

  fn engine_with_annotation() -> OverlayEngine {
    let mut engine = OverlayEngine::new("user-1", "doc-1", 50);
    let batch = ChunkBatch {
      chunk_id:                    "c0".into(),
      chunk_start:                 0,
      chunk_end:                   50,
      document_version_at_request: 0,
      annotations:                 vec![CandidateAnnotation {
        range:       Range::new(10, 15),
        kind:        AnnotationKind::Grammar,
        message:     "agreement".into(),
        suggestions: Vec::new(),
      }],
    };
    engine.handle(OverlayEvent::Analysis(batch)).unwrap();
    engine
  }

  #[test]
  fn composition_suppresses_view_not_store() {
    let mut engine = engine_with_annotation();
    assert_eq!(engine.view(Range::new(0, 50)).len(), 1);

    engine.handle(OverlayEvent::Composition(true)).unwrap();
    assert!(engine.view(Range::new(0, 50)).is_empty());
    assert_eq!(engine.store().len(), 1);

    engine.handle(OverlayEvent::Composition(false)).unwrap();
    assert_eq!(engine.view(Range::new(0, 50)).len(), 1);
  }

  #[test]
  fn store_keeps_remapping_during_composition() {
    let mut engine = engine_with_annotation();
    engine.handle(OverlayEvent::Composition(true)).unwrap();

    let edit = Edit::new(50).with_insert(0, 4);
    engine.handle(OverlayEvent::Edit(edit)).unwrap();
    engine.handle(OverlayEvent::Composition(false)).unwrap();

    let view = engine.view(Range::new(0, 54));
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].range, Range::new(14, 19));
  }

  #[test]
  fn clear_empties_the_overlay() {
    let mut engine = engine_with_annotation();
    assert_eq!(engine.handle(OverlayEvent::Clear).unwrap(), Dispatch::Cleared);
    assert!(engine.store().is_empty());
    assert!(engine.view(Range::new(0, 50)).is_empty());
  }

  #[test]
  fn malformed_edit_reports_and_changes_nothing() {
    let mut engine = engine_with_annotation();
    let bad = Edit::new(50).with_delete(45, 10);

    assert!(engine.handle(OverlayEvent::Edit(bad)).is_err());
    assert_eq!(engine.store().version(), 0);
    assert_eq!(engine.view(Range::new(0, 50)).len(), 1);
  }

  #[test]
  fn resolve_flows_through_to_feedback() {
    let mut engine = engine_with_annotation();
    let id = engine.store().iter().next().unwrap().id;

    let dispatch = engine
      .handle(OverlayEvent::Resolve {
        id,
        outcome: Outcome::Dismissed,
      })
      .unwrap();

    let Dispatch::Resolved(event) = dispatch else {
      panic!("expected a feedback event");
    };
    assert!(event.first_resolution);
    assert_eq!(event.outcome, Outcome::Dismissed);
    assert_eq!(event.user_id, "user-1");
  }
}
