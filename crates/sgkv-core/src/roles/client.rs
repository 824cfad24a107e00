//! Client role: a per-request state machine over scatter-gather buffers.
//!
//! A [`KvClient`] drives one request at a time through four states:
//!
//! ```text
//!            send_get / send_put                handle_response
//!   Idle ──────────────────────────▶ Sent ─────────────────────────▶ Completed
//!    ▲                                │  │                               │
//!    │                                │  └──── decode / type error ──▶ Failed
//!    │                                │                                  │
//!    └──────── next send_get / send_put re-arms the machine ◀───────────┘
//! ```
//!
//! `send_*` encodes a request and hands the caller an owned buffer to push
//! onto whatever transport is in use. The correlation id is caller-assigned
//! and opaque to this layer; callers that want unique ids without
//! bookkeeping draw them from a
//! [`RequestIdCounter`](crate::protocol::sequence::RequestIdCounter).
//! `handle_response` consumes the reply buffer, copies the fields it needs,
//! and lets the buffer drop — after it returns, no borrow of the
//! transport's memory survives.
//!
//! A response whose correlation id does not match the in-flight request is
//! rejected *without* disturbing the state machine: the real response can
//! still arrive and complete the request.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::buffer::segment::SegmentBuffer;
use crate::protocol::codec::CodecError;
use crate::protocol::format::WireFormat;
use crate::protocol::messages::{
    GetRequest, KvMessage, MessageType, PutRequest, RequestId, ResponseStatus,
};

/// Errors surfaced by the client role.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// `send_*` was called while a request was still awaiting its response.
    #[error("request {0} is already in flight")]
    AlreadyInFlight(RequestId),

    /// `handle_response` or `check_response` was called with no request
    /// outstanding.
    #[error("no request in flight")]
    NothingInFlight,

    /// `check_response` was called before the response arrived.
    #[error("request {0} is still awaiting its response")]
    StillInFlight(RequestId),

    /// The response echoed a different id than the in-flight request. The
    /// request stays in flight; the buffer was not for us.
    #[error("correlation mismatch: expected request id {expected}, response carried {actual}")]
    CorrelationMismatch {
        expected: RequestId,
        actual: RequestId,
    },

    /// The response correlated correctly but carried the wrong message
    /// type for the request that was sent.
    #[error("expected a {expected:?}, got a {actual:?}")]
    UnexpectedResponseType {
        expected: MessageType,
        actual: MessageType,
    },

    /// The buffer did not decode as a message at all.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// What a completed request produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// GET result: the stored value, or `None` when the key was absent.
    Get { value: Option<Vec<u8>> },
    /// PUT acknowledgement.
    Put { status: ResponseStatus },
}

impl std::fmt::Display for ResponseOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseOutcome::Get { value: Some(v) } => write!(f, "get hit ({} bytes)", v.len()),
            ResponseOutcome::Get { value: None } => write!(f, "get miss"),
            ResponseOutcome::Put {
                status: ResponseStatus::Ok,
            } => write!(f, "put ok"),
            ResponseOutcome::Put { status } => write!(f, "put {status:?}"),
        }
    }
}

/// Where the current request stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientState {
    /// No request outstanding.
    Idle,
    /// A request is on the wire awaiting its response.
    Sent {
        request_id: RequestId,
        expects: MessageType,
    },
    /// The response arrived and decoded cleanly.
    Completed(ResponseOutcome),
    /// The exchange failed. The error is kept for [`KvClient::check_response`].
    Failed(ClientError),
}

/// The client role.
///
/// Holds a shared [`WireFormat`] and the state of the current request;
/// both ends of a conversation must be constructed with the same format.
pub struct KvClient {
    format: Arc<dyn WireFormat>,
    state: ClientState,
}

impl KvClient {
    /// Creates a client speaking the given wire format.
    pub fn new(format: Arc<dyn WireFormat>) -> Self {
        Self {
            format,
            state: ClientState::Idle,
        }
    }

    /// Encodes a GET request for `key` under the caller-assigned
    /// `request_id` and arms the state machine.
    ///
    /// The returned buffer is owned by the caller; push it onto the
    /// transport and let it go.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AlreadyInFlight`] when a request is still
    /// awaiting its response, or [`ClientError::Codec`] when the wire
    /// format rejects the message. On error the state machine is
    /// unchanged.
    pub fn send_get(
        &mut self,
        request_id: RequestId,
        key: &[u8],
    ) -> Result<SegmentBuffer, ClientError> {
        self.ensure_idle()?;
        let msg = KvMessage::GetRequest(GetRequest {
            request_id,
            key: key.to_vec(),
        });
        let buf = self.format.encode(&msg)?;
        debug!("request {request_id}: get ({} byte key)", key.len());
        self.state = ClientState::Sent {
            request_id,
            expects: MessageType::GetResponse,
        };
        Ok(buf)
    }

    /// Encodes a PUT request for `key`/`value` under the caller-assigned
    /// `request_id` and arms the state machine.
    ///
    /// # Errors
    ///
    /// Same conditions as [`KvClient::send_get`].
    pub fn send_put(
        &mut self,
        request_id: RequestId,
        key: &[u8],
        value: &[u8],
    ) -> Result<SegmentBuffer, ClientError> {
        self.ensure_idle()?;
        let msg = KvMessage::PutRequest(PutRequest {
            request_id,
            key: key.to_vec(),
            value: value.to_vec(),
        });
        let buf = self.format.encode(&msg)?;
        debug!(
            "request {request_id}: put ({} byte key, {} byte value)",
            key.len(),
            value.len()
        );
        self.state = ClientState::Sent {
            request_id,
            expects: MessageType::PutResponse,
        };
        Ok(buf)
    }

    /// Consumes a response buffer, advances the state machine, and
    /// returns the id of the request the response completed.
    ///
    /// The buffer is decoded, its fields copied out, and the buffer
    /// released when this function returns — regardless of outcome.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NothingInFlight`] when no request is outstanding;
    ///   the buffer is discarded.
    /// - [`ClientError::CorrelationMismatch`] when the response answers a
    ///   different request id. The in-flight request stays in flight.
    /// - [`ClientError::Codec`] or [`ClientError::UnexpectedResponseType`]
    ///   when the buffer is corrupt or of the wrong type; the request
    ///   moves to [`ClientState::Failed`].
    pub fn handle_response(&mut self, buf: SegmentBuffer) -> Result<RequestId, ClientError> {
        let (request_id, expects) = match self.state {
            ClientState::Sent {
                request_id,
                expects,
            } => (request_id, expects),
            _ => return Err(ClientError::NothingInFlight),
        };

        let msg = match self.format.decode(&buf) {
            Ok(msg) => msg,
            Err(e) => {
                let err = ClientError::Codec(e);
                self.state = ClientState::Failed(err.clone());
                return Err(err);
            }
        };
        drop(buf); // every field is an owned copy by now

        if msg.request_id() != request_id {
            debug!(
                "request {request_id}: ignoring response for foreign id {}",
                msg.request_id()
            );
            return Err(ClientError::CorrelationMismatch {
                expected: request_id,
                actual: msg.request_id(),
            });
        }

        let outcome = match msg {
            KvMessage::GetResponse(m) if expects == MessageType::GetResponse => {
                ResponseOutcome::Get { value: m.value }
            }
            KvMessage::PutResponse(m) if expects == MessageType::PutResponse => {
                ResponseOutcome::Put { status: m.status }
            }
            other => {
                let err = ClientError::UnexpectedResponseType {
                    expected: expects,
                    actual: other.message_type(),
                };
                self.state = ClientState::Failed(err.clone());
                return Err(err);
            }
        };

        debug!("request {request_id}: {outcome}");
        self.state = ClientState::Completed(outcome);
        Ok(request_id)
    }

    /// Reads the outcome of the current request without touching the
    /// state machine.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NothingInFlight`] before any send,
    /// [`ClientError::StillInFlight`] while the response is pending, or
    /// the stored failure when the exchange failed.
    pub fn check_response(&self) -> Result<&ResponseOutcome, ClientError> {
        match &self.state {
            ClientState::Idle => Err(ClientError::NothingInFlight),
            ClientState::Sent { request_id, .. } => Err(ClientError::StillInFlight(*request_id)),
            ClientState::Completed(outcome) => Ok(outcome),
            ClientState::Failed(err) => Err(err.clone()),
        }
    }

    /// Current position of the request state machine.
    pub fn state(&self) -> &ClientState {
        &self.state
    }

    fn ensure_idle(&self) -> Result<(), ClientError> {
        if let ClientState::Sent { request_id, .. } = self.state {
            return Err(ClientError::AlreadyInFlight(request_id));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
