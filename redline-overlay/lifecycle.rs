//! The suggestion accept/reject lifecycle.
//!
//! Every annotation moves `pending → applied` or `pending → dismissed`, and
//! both terminal states are final. Resolving an already-terminal annotation
//! is a no-op that still yields the (idempotent) feedback event, so a retried
//! client action never errors and never double-counts: only events with
//! [`FeedbackEvent::first_resolution`] set represent a state change.
//!
//! The manager itself performs no I/O. It produces one [`FeedbackEvent`] per
//! resolve call; forwarding it to the feedback persistence collaborator
//! (which must be idempotent on retry) is the host's job.

use serde::{
  Deserialize,
  Serialize,
};

use redline_core::{
  Annotation,
  AnnotationId,
  AnnotationStatus,
  Outcome,
};

use crate::{
  OverlayError,
  Result,
  store::AnnotationStore,
};

/// What the host forwards to feedback persistence after a resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEvent {
  pub user_id:          String,
  pub document_id:      String,
  /// Snapshot of the annotation with its finalized status.
  pub annotation:       Annotation,
  /// The terminal outcome actually recorded. On an idempotent replay this is
  /// the original outcome, not the requested one.
  pub outcome:          Outcome,
  /// False when the annotation was already terminal and nothing changed.
  pub first_resolution: bool,
}

#[derive(Debug, Clone)]
pub struct LifecycleManager {
  user_id:     String,
  document_id: String,
}

impl LifecycleManager {
  #[must_use]
  pub fn new(user_id: impl Into<String>, document_id: impl Into<String>) -> Self {
    Self {
      user_id:     user_id.into(),
      document_id: document_id.into(),
    }
  }

  /// Record the user's verdict on an annotation.
  ///
  /// Fails with [`OverlayError::AnnotationNotFound`] when the id is absent
  /// from the store (e.g. the annotation was remapped away before the click
  /// landed); the caller decides whether to retry or ignore.
  pub fn resolve(
    &self,
    store: &mut AnnotationStore,
    id: AnnotationId,
    outcome: Outcome,
  ) -> Result<FeedbackEvent> {
    let annotation = store
      .get_mut(id)
      .ok_or(OverlayError::AnnotationNotFound(id))?;

    let first_resolution = !annotation.status.is_terminal();
    if first_resolution {
      annotation.status = outcome.into();
    }
    let outcome = match annotation.status {
      AnnotationStatus::Applied => Outcome::Applied,
      AnnotationStatus::Dismissed => Outcome::Dismissed,
      // just assigned above when it was still pending
      AnnotationStatus::Pending => outcome,
    };

    Ok(FeedbackEvent {
      user_id: self.user_id.clone(),
      document_id: self.document_id.clone(),
      annotation: annotation.clone(),
      outcome,
      first_resolution,
    })
  }
}
