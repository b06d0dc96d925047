pub mod annotation;
pub mod range;

pub use annotation::{
  Annotation,
  AnnotationId,
  AnnotationKind,
  AnnotationStatus,
  CandidateAnnotation,
  ChunkAttribution,
  ChunkBatch,
  ChunkId,
  Outcome,
};
pub use range::Range;
