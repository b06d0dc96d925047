//! The annotation data model.
//!
//! An [`Annotation`] is a position-anchored issue marker over document text:
//! an opaque stable id, a half-open [`Range`] in current-document offsets, an
//! issue kind, a human-readable message, and ordered replacement suggestions.
//! Annotations arrive in bulk as [`ChunkBatch`]es from the external analyzer
//! (chunk-local offsets) and are owned thereafter by the overlay store.

use serde::{
  Deserialize,
  Serialize,
};

use crate::range::Range;

/// Opaque annotation identity, stable across remapping and reconciliation.
/// Minted monotonically by the store; never reused within a store's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(pub u64);

/// Analyzer-chosen key identifying one analyzed text chunk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkId(pub String);

impl From<&str> for ChunkId {
  fn from(value: &str) -> Self {
    Self(value.to_string())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
  Grammar,
  Spelling,
  Style,
  Clarity,
  Punctuation,
}

/// Lifecycle status. Transitions are monotonic: `Pending` may move to either
/// terminal state, terminal states never change again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationStatus {
  #[default]
  Pending,
  Applied,
  Dismissed,
}

impl AnnotationStatus {
  pub fn is_terminal(self) -> bool {
    !matches!(self, Self::Pending)
  }
}

/// The user's verdict on a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
  Applied,
  Dismissed,
}

impl From<Outcome> for AnnotationStatus {
  fn from(outcome: Outcome) -> Self {
    match outcome {
      Outcome::Applied => Self::Applied,
      Outcome::Dismissed => Self::Dismissed,
    }
  }
}

/// Which analyzed chunk produced an annotation, and where inside that chunk.
/// Only consulted during reconciliation; retained afterwards for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkAttribution {
  pub chunk_id:    ChunkId,
  pub chunk_range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
  pub id:          AnnotationId,
  /// `[start, end)` in current-document offsets. Invariant while stored:
  /// `0 <= start < end <= doc_len`. A remap that breaks this drops the
  /// annotation instead of clamping it.
  pub range:       Range,
  pub kind:        AnnotationKind,
  pub message:     String,
  /// Ordered replacement candidates, possibly empty.
  pub suggestions: Vec<String>,
  pub chunk:       Option<ChunkAttribution>,
  pub status:      AnnotationStatus,
}

/// One analyzer finding, offsets still chunk-local.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateAnnotation {
  pub range:       Range,
  pub kind:        AnnotationKind,
  pub message:     String,
  #[serde(default)]
  pub suggestions: Vec<String>,
}

/// The unit of reconciler input: one chunk's analysis results, tagged with
/// the document span the chunk covered and the document version the text was
/// read at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkBatch {
  pub chunk_id:                    ChunkId,
  pub chunk_start:                 usize,
  pub chunk_end:                   usize,
  pub document_version_at_request: u64,
  pub annotations:                 Vec<CandidateAnnotation>,
}

impl ChunkBatch {
  /// The document span this chunk covered when the analysis was requested.
  pub fn span(&self) -> Range {
    Range::new(self.chunk_start, self.chunk_end)
  }
}
