//! Document edits and position mapping.
//!
//! An [`Edit`] is an ordered sequence of primitive operations, each an
//! insertion or deletion expressed in the offset space produced by the
//! previous operation (sequential composition, not independent parallel
//! application). The editing surface produces one [`Edit`] per atomic change
//! and applies it to the store exactly once.
//!
//! # Position Mapping
//!
//! [`Edit::map_pos`] carries a single offset through the edit:
//!
//! - An insertion at `o` of length `l` shifts every position `>= o` by `+l`
//!   and leaves positions `< o` alone. An insertion strictly inside an
//!   annotation therefore grows it, and an insertion exactly at its start
//!   pushes the whole annotation right.
//! - A deletion of `[o, o+l)` leaves positions `<= o` alone, shifts positions
//!   `>= o+l` by `-l`, and collapses positions strictly inside to `o`.
//!
//! [`Edit::map_range`] maps both endpoints and yields `None` when the mapped
//! range is empty or inverted: the span the annotation identified was
//! consumed by the edit, so the annotation must be dropped, not clamped.
//!
//! # Validation
//!
//! Operations referencing offsets beyond the (evolving) document length make
//! the whole edit malformed. A malformed edit is rejected before anything is
//! remapped; partial application would corrupt every later remap.

use smallvec::SmallVec;
use thiserror::Error;

use redline_core::Range;

pub type Result<T> = std::result::Result<T, EditError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum EditError {
  #[error("edit expects document length {expected}, store has {actual}")]
  LengthMismatch { expected: usize, actual: usize },
  #[error("insert at {at} is out of bounds for document length {len}")]
  InsertOutOfBounds { at: usize, len: usize },
  #[error("delete of {at}..{to} is out of bounds for document length {len}")]
  DeleteOutOfBounds { at: usize, to: usize, len: usize },
}

/// One primitive operation, offsets in the document space *before* this
/// operation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
  /// Insert `len` characters at `at`.
  Insert { at: usize, len: usize },

  /// Delete the `len` characters of `[at, at + len)`.
  Delete { at: usize, len: usize },
}

impl EditOp {
  fn map_pos(&self, pos: usize) -> usize {
    match *self {
      EditOp::Insert { at, len } => {
        if pos >= at {
          pos + len
        } else {
          pos
        }
      },
      EditOp::Delete { at, len } => {
        if pos <= at {
          pos
        } else if pos >= at + len {
          pos - len
        } else {
          at
        }
      },
    }
  }
}

/// An ordered list of operations over a document of a known length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
  ops: SmallVec<[EditOp; 2]>,
  /// The document length this edit applies to. The store refuses the edit
  /// unless it matches.
  len: usize,
}

impl Edit {
  #[must_use]
  pub fn new(doc_len: usize) -> Self {
    Self {
      ops: SmallVec::new(),
      len: doc_len,
    }
  }

  /// The document length this edit expects.
  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.ops.is_empty()
  }

  pub fn ops(&self) -> &[EditOp] {
    &self.ops
  }

  // Edit builder operations: insert/delete. Zero-length operations are
  // factored out at construction.
  //

  pub fn insert(&mut self, at: usize, len: usize) {
    if len == 0 {
      return;
    }
    self.ops.push(EditOp::Insert { at, len });
  }

  pub fn delete(&mut self, at: usize, len: usize) {
    if len == 0 {
      return;
    }
    self.ops.push(EditOp::Delete { at, len });
  }

  #[must_use]
  pub fn with_insert(mut self, at: usize, len: usize) -> Self {
    self.insert(at, len);
    self
  }

  #[must_use]
  pub fn with_delete(mut self, at: usize, len: usize) -> Self {
    self.delete(at, len);
    self
  }

  /// Check every operation against the evolving document length and return
  /// the length after the edit. The first out-of-bounds operation fails the
  /// whole edit.
  pub fn validate(&self, doc_len: usize) -> Result<usize> {
    if self.len != doc_len {
      return Err(EditError::LengthMismatch {
        expected: self.len,
        actual:   doc_len,
      });
    }

    let mut len = doc_len;
    for op in &self.ops {
      match *op {
        EditOp::Insert { at, len: n } => {
          if at > len {
            return Err(EditError::InsertOutOfBounds { at, len });
          }
          // an insertion that would overflow the document length is as
          // malformed as one past the end
          len = len
            .checked_add(n)
            .ok_or(EditError::InsertOutOfBounds { at, len })?;
        },
        EditOp::Delete { at, len: n } => {
          // phrased without `at + n` so absurd offsets error instead of
          // wrapping around
          if at > len || n > len - at {
            return Err(EditError::DeleteOutOfBounds {
              at,
              to: at.saturating_add(n),
              len,
            });
          }
          len -= n;
        },
      }
    }
    Ok(len)
  }

  /// Map a position through every operation in order. Positions inside
  /// deleted spans collapse to the deletion point.
  pub fn map_pos(&self, pos: usize) -> usize {
    self.ops.iter().fold(pos, |pos, op| op.map_pos(pos))
  }

  /// Map a range through the edit, or `None` if the edit consumed the span
  /// (the mapped range came out empty or inverted).
  pub fn map_range(&self, range: Range) -> Option<Range> {
    let start = self.map_pos(range.start);
    let end = self.map_pos(range.end);
    (start < end).then(|| Range::new(start, end))
  }

  /// Whether any operation lands on the given pre-edit range. Insertions at
  /// either boundary count: text inserted flush against a span can change
  /// what the span means. Deletions that merely abut do not.
  ///
  /// Used by the reconciler's staleness guard: a chunk result is only valid
  /// if no intervening edit touched the chunk's span.
  pub fn touches(&self, range: Range) -> bool {
    let mut span = range;
    for op in &self.ops {
      match *op {
        EditOp::Insert { at, len } => {
          if span.start <= at && at <= span.end {
            return true;
          }
          if at < span.start {
            span = span.translate(len);
          }
        },
        EditOp::Delete { at, len } => {
          if Range::new(at, at + len).intersects(&span) {
            return true;
          }
          if at + len <= span.start {
            span.start -= len;
            span.end -= len;
          }
        },
      }
    }
    false
  }
}
