//! Half-open offset ranges over document text.
//!
//! A [`Range`] is `[start, end)` in character offsets of the current
//! document. Annotations anchor to ranges; the overlay engine remaps them
//! through edits and drops them when the underlying span stops existing.
//!
//! Ranges are plain data: all interval math lives here, all remapping policy
//! lives in the overlay crate.

use serde::{
  Deserialize,
  Serialize,
};

/// `[start, end)` over document character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Range {
  pub start: usize,
  pub end:   usize,
}

impl Range {
  #[must_use]
  pub fn new(start: usize, end: usize) -> Self {
    Self { start, end }
  }

  /// A zero-width range at `pos`. Zero-width ranges never pass
  /// [`Range::is_valid_for`]; they exist only as intermediate values during
  /// remapping.
  #[must_use]
  pub fn point(pos: usize) -> Self {
    Self {
      start: pos,
      end:   pos,
    }
  }

  pub fn len(&self) -> usize {
    self.end.saturating_sub(self.start)
  }

  pub fn is_empty(&self) -> bool {
    self.start >= self.end
  }

  /// Whether `pos` falls inside the half-open interval.
  pub fn contains(&self, pos: usize) -> bool {
    self.start <= pos && pos < self.end
  }

  /// Half-open intersection test. Ranges that merely touch at a boundary do
  /// not intersect.
  pub fn intersects(&self, other: &Range) -> bool {
    self.start < other.end && other.start < self.end
  }

  /// Shift both endpoints right by `delta`. Used to lift chunk-local offsets
  /// into document-global space.
  #[must_use]
  pub fn translate(&self, delta: usize) -> Self {
    Self {
      start: self.start + delta,
      end:   self.end + delta,
    }
  }

  /// The stored-annotation invariant: `0 <= start < end <= doc_len`.
  pub fn is_valid_for(&self, doc_len: usize) -> bool {
    self.start < self.end && self.end <= doc_len
  }
}

impl From<(usize, usize)> for Range {
  fn from((start, end): (usize, usize)) -> Self {
    Self::new(start, end)
  }
}
