//! Binary codec for encoding and decoding KV messages into scatter-gather
//! buffers.
//!
//! Wire format:
//! ```text
//! [version:1][msg_type:1][status:1][reserved:1][request_id:8][key_len:4][value_len:4][key:K][value:V]
//! ```
//! Envelope size: 20 bytes. All multi-byte integers are big-endian. The
//! status byte is meaningful in responses and 0x00 in requests. Key and
//! value are length-prefixed raw bytes — embedded zeros are preserved.
//!
//! [`encode_message`] produces a per-segment buffer (envelope segment plus
//! one segment each for a non-empty key and value). [`decode_message`]
//! accepts *any* segmentation of the same bytes: lengths come from the
//! envelope, never from segment boundaries, and every field is copied out
//! so the caller may release the buffer immediately afterwards.

use thiserror::Error;

use crate::buffer::reader::{ReadUnderrun, SegmentReader};
use crate::buffer::segment::SegmentBuffer;
use crate::protocol::messages::{
    GetRequest, GetResponse, KvMessage, MessageType, PutRequest, PutResponse, RequestId,
    ResponseStatus, ENVELOPE_LEN, PROTOCOL_VERSION,
};

/// Errors that can occur while decoding a buffer or running a fallible
/// wire-format backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The buffer ended before the bytes the envelope promised.
    #[error("message truncated: needed {needed} more bytes, buffer had {available}")]
    Truncated { needed: usize, available: usize },

    /// The version byte does not match [`PROTOCOL_VERSION`].
    #[error("unsupported protocol version: 0x{0:02X}")]
    UnsupportedVersion(u8),

    /// The message type byte is not a recognized tag.
    #[error("unknown message type: 0x{0:02X}")]
    UnknownType(u8),

    /// The status byte of a response is not a recognized value.
    #[error("unknown response status: 0x{0:02X}")]
    UnknownStatus(u8),

    /// The declared key/value lengths disagree with the buffer's actual
    /// total length.
    #[error("length mismatch: envelope declares {declared} payload bytes, buffer carries {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    /// The payload shape is inconsistent with the type tag.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A fallible serialization backend failed.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<ReadUnderrun> for CodecError {
    fn from(err: ReadUnderrun) -> Self {
        CodecError::Truncated {
            needed: err.requested,
            available: err.remaining,
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`KvMessage`] into a per-segment [`SegmentBuffer`]: the
/// 20-byte envelope in its own segment, followed by one segment each for a
/// non-empty key and value. Zero-length fields produce no segment; their
/// lengths in the envelope carry the truth.
///
/// Encoding a well-formed in-memory message cannot fail. Keys and values
/// longer than `u32::MAX` bytes are outside the wire format's domain.
pub fn encode_message(msg: &KvMessage) -> SegmentBuffer {
    let (status, key, value) = match msg {
        KvMessage::GetRequest(m) => (ResponseStatus::Ok, Some(&m.key), None),
        KvMessage::GetResponse(m) => match &m.value {
            Some(v) => (ResponseStatus::Ok, None, Some(v)),
            None => (ResponseStatus::NotFound, None, None),
        },
        KvMessage::PutRequest(m) => (ResponseStatus::Ok, Some(&m.key), Some(&m.value)),
        KvMessage::PutResponse(m) => (m.status, None, None),
    };
    let key_len = key.map_or(0, |k| k.len());
    let value_len = value.map_or(0, |v| v.len());

    let envelope = encode_envelope(
        msg.message_type(),
        status,
        msg.request_id(),
        key_len,
        value_len,
    );

    let mut segments: Vec<Box<[u8]>> = Vec::with_capacity(3);
    segments.push(envelope.into_boxed_slice());
    if let Some(k) = key {
        if !k.is_empty() {
            segments.push(k.clone().into_boxed_slice());
        }
    }
    if let Some(v) = value {
        if !v.is_empty() {
            segments.push(v.clone().into_boxed_slice());
        }
    }
    SegmentBuffer::from_segments(segments)
}

/// Decodes one [`KvMessage`] from a buffer holding exactly one encoded
/// message.
///
/// Key and value come back as owned copies — nothing in the result borrows
/// from `buf`, so the caller is free to release the buffer right away.
///
/// # Errors
///
/// Returns [`CodecError`] when the buffer is shorter than the envelope,
/// carries a foreign version byte, an unknown type or status tag, declared
/// lengths that disagree with the buffer's total length, or a payload
/// shape inconsistent with the type tag.
pub fn decode_message(buf: &SegmentBuffer) -> Result<KvMessage, CodecError> {
    let mut reader = SegmentReader::new(buf);

    let version = reader.read_u8()?;
    if version != PROTOCOL_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }

    let type_byte = reader.read_u8()?;
    let msg_type =
        MessageType::try_from(type_byte).map_err(|_| CodecError::UnknownType(type_byte))?;

    let status_byte = reader.read_u8()?;
    let _reserved = reader.read_u8()?;
    let request_id = reader.read_u64()?;
    let key_len = reader.read_u32()? as usize;
    let value_len = reader.read_u32()? as usize;

    // One message per buffer: the declared lengths must account for every
    // byte after the envelope, no more and no fewer.
    let declared = key_len.saturating_add(value_len);
    if declared != reader.remaining() {
        return Err(CodecError::LengthMismatch {
            declared,
            actual: reader.remaining(),
        });
    }

    match msg_type {
        MessageType::GetRequest => {
            if value_len != 0 {
                return Err(CodecError::MalformedPayload(
                    "GetRequest carries a value field".to_string(),
                ));
            }
            let key = reader.read_vec(key_len)?;
            Ok(KvMessage::GetRequest(GetRequest { request_id, key }))
        }
        MessageType::GetResponse => {
            if key_len != 0 {
                return Err(CodecError::MalformedPayload(
                    "GetResponse carries a key field".to_string(),
                ));
            }
            let status = response_status(status_byte)?;
            let value = match status {
                ResponseStatus::Ok => Some(reader.read_vec(value_len)?),
                ResponseStatus::NotFound => {
                    if value_len != 0 {
                        return Err(CodecError::MalformedPayload(
                            "not-found GetResponse carries a value field".to_string(),
                        ));
                    }
                    None
                }
            };
            Ok(KvMessage::GetResponse(GetResponse { request_id, value }))
        }
        MessageType::PutRequest => {
            let key = reader.read_vec(key_len)?;
            let value = reader.read_vec(value_len)?;
            Ok(KvMessage::PutRequest(PutRequest {
                request_id,
                key,
                value,
            }))
        }
        MessageType::PutResponse => {
            if key_len != 0 || value_len != 0 {
                return Err(CodecError::MalformedPayload(
                    "PutResponse carries key or value fields".to_string(),
                ));
            }
            let status = response_status(status_byte)?;
            Ok(KvMessage::PutResponse(PutResponse { request_id, status }))
        }
    }
}

/// Cheap, allocation-free classification of a buffer's message type.
///
/// Returns `None` — rather than an error — when the buffer is too short,
/// carries a foreign version byte, or an unrecognized tag, so callers can
/// tell "not our protocol" apart from "our protocol but corrupt" before
/// paying for a full decode.
pub fn probe_message_type(buf: &SegmentBuffer) -> Option<MessageType> {
    if buf.byte_at(0)? != PROTOCOL_VERSION {
        return None;
    }
    MessageType::try_from(buf.byte_at(1)?).ok()
}

// ── Envelope helpers ──────────────────────────────────────────────────────────

fn encode_envelope(
    msg_type: MessageType,
    status: ResponseStatus,
    request_id: RequestId,
    key_len: usize,
    value_len: usize,
) -> Vec<u8> {
    debug_assert!(key_len <= u32::MAX as usize && value_len <= u32::MAX as usize);
    let mut buf = Vec::with_capacity(ENVELOPE_LEN);
    buf.push(PROTOCOL_VERSION);
    buf.push(msg_type as u8);
    buf.push(status as u8);
    buf.push(0x00); // reserved
    buf.extend_from_slice(&request_id.to_be_bytes());
    buf.extend_from_slice(&(key_len as u32).to_be_bytes());
    buf.extend_from_slice(&(value_len as u32).to_be_bytes());
    buf
}

fn response_status(byte: u8) -> Result<ResponseStatus, CodecError> {
    ResponseStatus::try_from(byte).map_err(|_| CodecError::UnknownStatus(byte))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
