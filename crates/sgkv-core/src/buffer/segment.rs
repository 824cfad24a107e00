//! Owned scatter-gather buffers with a tagged ownership mode.
//!
//! A [`SegmentBuffer`] describes one logical byte string as an ordered list
//! of segments. Two backing shapes exist, and the difference is who owns
//! what:
//!
//! ```text
//! Unified                              PerSegment
//! ┌────────────────────────────┐      ┌───────┐ ┌────────────┐ ┌───┐
//! │      one allocation        │      │ seg 0 │ │   seg 1    │ │ 2 │
//! └────────────────────────────┘      └───────┘ └────────────┘ └───┘
//!   ▲span 0▲  ▲span 1▲  ▲span 2▲       three independent allocations
//! ```
//!
//! - **Unified**: every segment is a span into a single backing allocation.
//!   The I/O layer delivers inbound data this way: one receive buffer,
//!   sliced. Dropping the buffer frees the backing allocation exactly once;
//!   individual spans can never be freed on their own.
//! - **PerSegment**: every segment is its own allocation. The codec builds
//!   outbound messages this way (envelope, key, and value each have their
//!   own lifetime). Dropping the buffer frees each segment exactly once,
//!   and [`SegmentBuffer::take_segment`] can detach one segment and hand
//!   its allocation to the caller.
//!
//! Confusing the two shapes is the classic double-free/leak bug in
//! scatter-gather code. Here the shape is an enum variant, release is the
//! `Drop` impl, and a buffer moves rather than being flagged, so the
//! mistake has no representation.

use thiserror::Error;

/// Errors from [`SegmentBuffer`] construction and segment manipulation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    /// A requested span does not fit inside the backing allocation.
    #[error("span at offset {offset} with length {len} exceeds the {backing}-byte backing allocation")]
    SpanOutOfBounds {
        offset: usize,
        len: usize,
        backing: usize,
    },

    /// A segment index was past the end of the segment list.
    #[error("segment index {index} out of range for {count} segments")]
    IndexOutOfRange { index: usize, count: usize },

    /// A per-segment-only operation was attempted on a unified buffer.
    #[error("cannot detach a segment from a unified backing allocation")]
    UnifiedBacking,
}

/// Which ownership shape a buffer currently has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipMode {
    /// All segments are spans into one backing allocation.
    Unified,
    /// Each segment is an independently owned allocation.
    PerSegment,
}

/// A span into the unified backing allocation.
#[derive(Debug, Clone, Copy)]
struct Span {
    offset: usize,
    len: usize,
}

/// The two backing shapes. Kept private so every access and the release
/// path go through methods that match exhaustively on the mode.
#[derive(Debug)]
enum Backing {
    Unified { data: Box<[u8]>, spans: Vec<Span> },
    PerSegment { segments: Vec<Box<[u8]>> },
}

/// An owned scatter-gather buffer.
///
/// Dropping the buffer releases its memory according to its mode: one
/// deallocation for a unified buffer, one per segment otherwise. There is
/// no separate release call to forget or to call twice — ownership moves
/// with the value.
#[derive(Debug)]
pub struct SegmentBuffer {
    backing: Backing,
}

impl SegmentBuffer {
    /// Creates an inert buffer: zero segments, zero length. Dropping it
    /// frees nothing.
    pub fn empty() -> Self {
        Self {
            backing: Backing::PerSegment {
                segments: Vec::new(),
            },
        }
    }

    /// Creates a unified buffer with a single span covering the entire
    /// backing allocation — the shape the I/O layer typically delivers.
    pub fn contiguous(data: impl Into<Box<[u8]>>) -> Self {
        let data = data.into();
        let span = Span {
            offset: 0,
            len: data.len(),
        };
        Self {
            backing: Backing::Unified {
                data,
                spans: vec![span],
            },
        }
    }

    /// Creates a unified buffer whose segments are the given
    /// `(offset, len)` spans into `data`.
    ///
    /// Spans may touch or overlap; each must lie inside the allocation.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::SpanOutOfBounds`] if any span reaches past
    /// the end of `data`.
    pub fn unified(
        data: impl Into<Box<[u8]>>,
        spans: &[(usize, usize)],
    ) -> Result<Self, BufferError> {
        let data = data.into();
        let mut checked = Vec::with_capacity(spans.len());
        for &(offset, len) in spans {
            let fits = offset
                .checked_add(len)
                .is_some_and(|end| end <= data.len());
            if !fits {
                return Err(BufferError::SpanOutOfBounds {
                    offset,
                    len,
                    backing: data.len(),
                });
            }
            checked.push(Span { offset, len });
        }
        Ok(Self {
            backing: Backing::Unified {
                data,
                spans: checked,
            },
        })
    }

    /// Creates a per-segment buffer that takes ownership of each given
    /// allocation — the shape the codec assembles outbound messages in.
    pub fn from_segments(segments: Vec<Box<[u8]>>) -> Self {
        Self {
            backing: Backing::PerSegment { segments },
        }
    }

    /// Reports which ownership shape this buffer has.
    pub fn mode(&self) -> OwnershipMode {
        match &self.backing {
            Backing::Unified { .. } => OwnershipMode::Unified,
            Backing::PerSegment { .. } => OwnershipMode::PerSegment,
        }
    }

    /// Number of segments, counting zero-length ones.
    pub fn segment_count(&self) -> usize {
        match &self.backing {
            Backing::Unified { spans, .. } => spans.len(),
            Backing::PerSegment { segments } => segments.len(),
        }
    }

    /// Borrows one segment's bytes, or `None` past the end.
    pub fn segment(&self, index: usize) -> Option<&[u8]> {
        match &self.backing {
            Backing::Unified { data, spans } => {
                let span = spans.get(index)?;
                Some(&data[span.offset..span.offset + span.len])
            }
            Backing::PerSegment { segments } => segments.get(index).map(|s| &s[..]),
        }
    }

    /// Iterates over the segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.segment_count()).filter_map(move |i| self.segment(i))
    }

    /// Sum of all segment lengths. Zero for an inert buffer.
    pub fn total_len(&self) -> usize {
        self.segments().map(<[u8]>::len).sum()
    }

    /// True when the buffer holds no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    /// Reads the byte at logical position `pos`, crossing segment
    /// boundaries as needed. Allocation-free; `None` past the end.
    pub fn byte_at(&self, pos: usize) -> Option<u8> {
        let mut skip = pos;
        for seg in self.segments() {
            if skip < seg.len() {
                return Some(seg[skip]);
            }
            skip -= seg.len();
        }
        None
    }

    /// Copies all segments into one contiguous `Vec` in order.
    pub fn to_contiguous(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_len());
        for seg in self.segments() {
            out.extend_from_slice(seg);
        }
        out
    }

    /// Detaches one segment and returns its allocation to the caller, who
    /// now frees it independently of the rest of the buffer. The remaining
    /// segments keep their order.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::UnifiedBacking`] on a unified buffer, whose
    /// backing allocation is shared by every span, and
    /// [`BufferError::IndexOutOfRange`] for a bad index.
    pub fn take_segment(&mut self, index: usize) -> Result<Box<[u8]>, BufferError> {
        match &mut self.backing {
            Backing::Unified { .. } => Err(BufferError::UnifiedBacking),
            Backing::PerSegment { segments } => {
                if index >= segments.len() {
                    return Err(BufferError::IndexOutOfRange {
                        index,
                        count: segments.len(),
                    });
                }
                Ok(segments.remove(index))
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
