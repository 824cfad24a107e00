//! Buffer transport seam.
//!
//! [`BufferChannel`] is the narrow interface the roles need from a
//! transport: push an owned buffer out, poll an owned buffer in. A push
//! *moves* the buffer into the channel and a pop moves one out, so exactly
//! one side owns any buffer at any moment and release stays a plain drop.
//!
//! [`LoopbackChannel`] is the in-tree implementation: two connected ends
//! over in-process queues, enough for tests and single-process benchmark
//! runs. Network transports implement the same trait out of tree.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use thiserror::Error;

use crate::buffer::segment::SegmentBuffer;

/// Errors surfaced by a buffer channel.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// The peer end has been dropped.
    #[error("channel disconnected")]
    Disconnected,
}

/// Owned-buffer transport endpoint.
pub trait BufferChannel {
    /// Sends a buffer, transferring its ownership into the channel.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Disconnected`] when the peer end is gone;
    /// the buffer is dropped in that case.
    fn push(&self, buf: SegmentBuffer) -> Result<(), ChannelError>;

    /// Non-blocking receive.
    ///
    /// `Ok(Some(buf))` hands over an owned buffer; `Ok(None)` means the
    /// channel is momentarily empty.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Disconnected`] when the peer end is gone
    /// and no queued buffers remain.
    fn pop(&self) -> Result<Option<SegmentBuffer>, ChannelError>;
}

/// One end of an in-process buffer pipe.
pub struct LoopbackChannel {
    tx: Sender<SegmentBuffer>,
    rx: Receiver<SegmentBuffer>,
}

impl LoopbackChannel {
    /// Creates a connected pair of ends. Buffers pushed on one end pop
    /// out of the other.
    pub fn pair() -> (LoopbackChannel, LoopbackChannel) {
        let (left_tx, right_rx) = mpsc::channel();
        let (right_tx, left_rx) = mpsc::channel();
        (
            LoopbackChannel {
                tx: left_tx,
                rx: left_rx,
            },
            LoopbackChannel {
                tx: right_tx,
                rx: right_rx,
            },
        )
    }

    /// Blocking receive, for dedicated service threads that have nothing
    /// to do until a buffer arrives.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Disconnected`] when the peer end is gone
    /// and no queued buffers remain.
    pub fn recv(&self) -> Result<SegmentBuffer, ChannelError> {
        self.rx.recv().map_err(|_| ChannelError::Disconnected)
    }
}

impl BufferChannel for LoopbackChannel {
    fn push(&self, buf: SegmentBuffer) -> Result<(), ChannelError> {
        self.tx.send(buf).map_err(|_| ChannelError::Disconnected)
    }

    fn pop(&self) -> Result<Option<SegmentBuffer>, ChannelError> {
        match self.rx.try_recv() {
            Ok(buf) => Ok(Some(buf)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(ChannelError::Disconnected),
        }
    }
}
