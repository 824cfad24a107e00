//! Forward cursor over a [`SegmentBuffer`]'s bytes.
//!
//! The wire codec reads envelopes and fields through this cursor so that
//! decoding works for any segmentation of the same bytes — one contiguous
//! inbound segment, the codec's envelope/key/value split, or anything the
//! I/O layer produced. Multi-byte integers are big-endian, matching the
//! wire format.

use thiserror::Error;

use crate::buffer::segment::SegmentBuffer;

/// A read was requested past the end of the buffer.
///
/// Carries how much the caller wanted and how much was actually left, so
/// the codec can report a precise truncation error.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("needed {requested} more bytes, only {remaining} remain in the buffer")]
pub struct ReadUnderrun {
    pub requested: usize,
    pub remaining: usize,
}

/// Forward, non-seeking reader over a buffer's segments.
pub struct SegmentReader<'a> {
    buffer: &'a SegmentBuffer,
    /// Index of the segment the cursor is in.
    segment: usize,
    /// Byte offset within that segment.
    offset: usize,
    /// Total bytes consumed so far.
    consumed: usize,
}

impl<'a> SegmentReader<'a> {
    /// Creates a reader positioned at the first byte of `buffer`.
    pub fn new(buffer: &'a SegmentBuffer) -> Self {
        Self {
            buffer,
            segment: 0,
            offset: 0,
            consumed: 0,
        }
    }

    /// Bytes consumed since construction.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buffer.total_len() - self.consumed
    }

    /// Fills `out` from the cursor position, crossing segment boundaries
    /// and skipping zero-length segments.
    ///
    /// # Errors
    ///
    /// Returns [`ReadUnderrun`] without consuming anything if fewer than
    /// `out.len()` bytes remain.
    pub fn read_exact(&mut self, out: &mut [u8]) -> Result<(), ReadUnderrun> {
        if out.len() > self.remaining() {
            return Err(ReadUnderrun {
                requested: out.len(),
                remaining: self.remaining(),
            });
        }
        let mut filled = 0;
        while filled < out.len() {
            let seg = match self.buffer.segment(self.segment) {
                Some(seg) => seg,
                // Unreachable: the remaining() check above guarantees
                // enough bytes exist in the segments ahead.
                None => break,
            };
            let avail = &seg[self.offset..];
            if avail.is_empty() {
                self.segment += 1;
                self.offset = 0;
                continue;
            }
            let n = avail.len().min(out.len() - filled);
            out[filled..filled + n].copy_from_slice(&avail[..n]);
            filled += n;
            self.offset += n;
            self.consumed += n;
        }
        Ok(())
    }

    /// Reads one byte.
    ///
    /// # Errors
    ///
    /// Returns [`ReadUnderrun`] at end of buffer.
    pub fn read_u8(&mut self) -> Result<u8, ReadUnderrun> {
        let mut b = [0u8; 1];
        self.read_exact(&mut b)?;
        Ok(b[0])
    }

    /// Reads a big-endian `u32`.
    ///
    /// # Errors
    ///
    /// Returns [`ReadUnderrun`] if fewer than four bytes remain.
    pub fn read_u32(&mut self) -> Result<u32, ReadUnderrun> {
        let mut b = [0u8; 4];
        self.read_exact(&mut b)?;
        Ok(u32::from_be_bytes(b))
    }

    /// Reads a big-endian `u64`.
    ///
    /// # Errors
    ///
    /// Returns [`ReadUnderrun`] if fewer than eight bytes remain.
    pub fn read_u64(&mut self) -> Result<u64, ReadUnderrun> {
        let mut b = [0u8; 8];
        self.read_exact(&mut b)?;
        Ok(u64::from_be_bytes(b))
    }

    /// Reads `len` bytes into a fresh `Vec`.
    ///
    /// The length is validated against the remaining bytes before any
    /// allocation, so a lying length field cannot trigger a huge alloc.
    ///
    /// # Errors
    ///
    /// Returns [`ReadUnderrun`] if fewer than `len` bytes remain.
    pub fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, ReadUnderrun> {
        if len > self.remaining() {
            return Err(ReadUnderrun {
                requested: len,
                remaining: self.remaining(),
            });
        }
        let mut out = vec![0u8; len];
        self.read_exact(&mut out)?;
        Ok(out)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
