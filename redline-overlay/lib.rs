//! Live annotation overlay engine for a continuously edited document.
//!
//! The overlay keeps a set of position-anchored issue markers
//! ([`Annotation`]s) correct while the user edits the text underneath them:
//!
//! - [`edit`]: edits as ordered insert/delete operations, and the position
//!   mapping that carries a [`Range`] through them.
//! - [`store`]: the per-document [`AnnotationStore`] with replace-all,
//!   remap-through-edit, and intersection queries.
//! - [`reconcile`]: merges chunk-local analyzer batches into the store
//!   without disturbing annotations owned by other chunks.
//! - [`lifecycle`]: the pending to applied/dismissed state machine and the
//!   feedback events it produces for the host to persist.
//! - [`engine`]: the event-driven front door the editing surface talks to.
//!
//! The overlay never owns the document text, never performs I/O, and never
//! aborts the host: failures are local and reported through return values.

use thiserror::Error;

pub mod edit;
pub mod engine;
pub mod lifecycle;
pub mod reconcile;
pub mod store;

pub use edit::{
  Edit,
  EditError,
  EditOp,
};
pub use engine::{
  Dispatch,
  OverlayEngine,
  OverlayEvent,
};
pub use lifecycle::{
  FeedbackEvent,
  LifecycleManager,
};
pub use reconcile::{
  MergeOutcome,
  reconcile,
};
pub use redline_core::{
  Annotation,
  AnnotationId,
  AnnotationKind,
  AnnotationStatus,
  CandidateAnnotation,
  ChunkAttribution,
  ChunkBatch,
  ChunkId,
  Outcome,
  Range,
};
pub use store::AnnotationStore;

pub type Result<T> = std::result::Result<T, OverlayError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum OverlayError {
  #[error(transparent)]
  Edit(#[from] EditError),
  #[error("no annotation with id {0:?} in the store")]
  AnnotationNotFound(AnnotationId),
}
