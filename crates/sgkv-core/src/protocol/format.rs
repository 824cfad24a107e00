//! Pluggable wire formats.
//!
//! [`WireFormat`] abstracts how a [`KvMessage`] turns into buffer bytes and
//! back, so the client and server roles never commit to one serialization
//! scheme. Two implementations ship in-tree:
//!
//! - [`EnvelopeFormat`] — the hand-written 20-byte envelope layout from
//!   [`crate::protocol::codec`]. Scatter-gather friendly: key and value
//!   bytes land in their own segments.
//! - [`BincodeFormat`] — `serde` + `bincode`, for workloads that prefer a
//!   derived codec over a hand-maintained one. Always encodes into a
//!   single contiguous segment.
//!
//! Both sides of a conversation must agree on the format; `probe` exists
//! so a receiver can cheaply check that agreement before a full decode.

use crate::buffer::segment::SegmentBuffer;
use crate::protocol::codec::{self, CodecError};
use crate::protocol::messages::{KvMessage, MessageType};

/// Strategy for turning messages into buffers and back.
///
/// Implementations are stateless and shared behind `Arc<dyn WireFormat>`,
/// so the trait requires `Send + Sync`.
pub trait WireFormat: Send + Sync {
    /// Short lowercase name for logs and reports.
    fn name(&self) -> &'static str;

    /// Encodes a message into a buffer.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Serialization`] when a fallible backend
    /// rejects the message. The envelope format never fails.
    fn encode(&self, msg: &KvMessage) -> Result<SegmentBuffer, CodecError>;

    /// Decodes one message from a buffer, copying all fields out so the
    /// buffer can be released immediately.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError`] when the bytes are not one well-formed
    /// message in this format.
    fn decode(&self, buf: &SegmentBuffer) -> Result<KvMessage, CodecError>;

    /// Classifies a buffer's message type without decoding the payload.
    ///
    /// `None` means "not recognizably this format", which is a routing
    /// signal rather than an error.
    fn probe(&self, buf: &SegmentBuffer) -> Option<MessageType>;
}

// ── Envelope format ───────────────────────────────────────────────────────────

/// The hand-written envelope layout. See [`crate::protocol::codec`] for
/// the byte-level contract.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvelopeFormat;

impl WireFormat for EnvelopeFormat {
    fn name(&self) -> &'static str {
        "envelope"
    }

    fn encode(&self, msg: &KvMessage) -> Result<SegmentBuffer, CodecError> {
        Ok(codec::encode_message(msg))
    }

    fn decode(&self, buf: &SegmentBuffer) -> Result<KvMessage, CodecError> {
        codec::decode_message(buf)
    }

    fn probe(&self, buf: &SegmentBuffer) -> Option<MessageType> {
        codec::probe_message_type(buf)
    }
}

// ── Bincode format ────────────────────────────────────────────────────────────

/// `serde`-derived codec over `bincode`'s fixed-width little-endian
/// encoding. The enum variant index occupies the first four bytes, which
/// is what `probe` inspects.
#[derive(Debug, Default, Clone, Copy)]
pub struct BincodeFormat;

impl WireFormat for BincodeFormat {
    fn name(&self) -> &'static str {
        "bincode"
    }

    fn encode(&self, msg: &KvMessage) -> Result<SegmentBuffer, CodecError> {
        let bytes =
            bincode::serialize(msg).map_err(|e| CodecError::Serialization(e.to_string()))?;
        Ok(SegmentBuffer::contiguous(bytes))
    }

    fn decode(&self, buf: &SegmentBuffer) -> Result<KvMessage, CodecError> {
        let bytes = buf.to_contiguous();
        bincode::deserialize(&bytes).map_err(|e| CodecError::MalformedPayload(e.to_string()))
    }

    fn probe(&self, buf: &SegmentBuffer) -> Option<MessageType> {
        let tag = u32::from_le_bytes([
            buf.byte_at(0)?,
            buf.byte_at(1)?,
            buf.byte_at(2)?,
            buf.byte_at(3)?,
        ]);
        // Variant indices follow KvMessage's declaration order.
        match tag {
            0 => Some(MessageType::GetRequest),
            1 => Some(MessageType::GetResponse),
            2 => Some(MessageType::PutRequest),
            3 => Some(MessageType::PutResponse),
            _ => None,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::{
        GetRequest, GetResponse, PutRequest, PutResponse, ResponseStatus,
    };
    use std::sync::Arc;

    fn sample_messages() -> Vec<KvMessage> {
        vec![
            KvMessage::GetRequest(GetRequest {
                request_id: 1,
                key: b"alpha".to_vec(),
            }),
            KvMessage::GetResponse(GetResponse {
                request_id: 1,
                value: Some(b"beta".to_vec()),
            }),
            KvMessage::GetResponse(GetResponse {
                request_id: 2,
                value: None,
            }),
            KvMessage::PutRequest(PutRequest {
                request_id: 3,
                key: b"gamma".to_vec(),
                value: vec![0x00, 0xFF, 0x10],
            }),
            KvMessage::PutResponse(PutResponse {
                request_id: 3,
                status: ResponseStatus::Ok,
            }),
        ]
    }

    fn assert_round_trips(format: &dyn WireFormat) {
        for msg in sample_messages() {
            let buf = format.encode(&msg).expect("encode failed");
            let decoded = format.decode(&buf).expect("decode failed");
            assert_eq!(decoded, msg, "{} format mangled {msg:?}", format.name());
        }
    }

    #[test]
    fn test_envelope_format_round_trips_through_the_trait() {
        assert_round_trips(&EnvelopeFormat);
    }

    #[test]
    fn test_bincode_format_round_trips_through_the_trait() {
        assert_round_trips(&BincodeFormat);
    }

    #[test]
    fn test_formats_are_usable_as_shared_trait_objects() {
        let formats: Vec<Arc<dyn WireFormat>> =
            vec![Arc::new(EnvelopeFormat), Arc::new(BincodeFormat)];
        let msg = KvMessage::PutResponse(PutResponse {
            request_id: 9,
            status: ResponseStatus::NotFound,
        });

        for format in formats {
            let buf = format.encode(&msg).unwrap();
            assert_eq!(format.decode(&buf).unwrap(), msg);
        }
    }

    #[test]
    fn test_probe_agrees_with_encode_for_both_formats() {
        for format in [&EnvelopeFormat as &dyn WireFormat, &BincodeFormat] {
            for msg in sample_messages() {
                let buf = format.encode(&msg).unwrap();
                assert_eq!(
                    format.probe(&buf),
                    Some(msg.message_type()),
                    "{} probe misclassified {msg:?}",
                    format.name()
                );
            }
        }
    }

    #[test]
    fn test_envelope_bytes_do_not_decode_as_bincode() {
        let msg = KvMessage::GetRequest(GetRequest {
            request_id: 5,
            key: b"key".to_vec(),
        });
        let envelope_buf = EnvelopeFormat.encode(&msg).unwrap();
        assert!(BincodeFormat.decode(&envelope_buf).is_err());
        assert_eq!(BincodeFormat.probe(&envelope_buf), None);
    }

    #[test]
    fn test_bincode_bytes_do_not_decode_as_envelope() {
        // GetResponse is the nastier case: its bincode variant index is 1,
        // so the first byte collides with the envelope version byte.
        let messages = [
            KvMessage::GetRequest(GetRequest {
                request_id: 5,
                key: b"key".to_vec(),
            }),
            KvMessage::GetResponse(GetResponse {
                request_id: 5,
                value: Some(b"v".to_vec()),
            }),
        ];
        for msg in messages {
            let bincode_buf = BincodeFormat.encode(&msg).unwrap();
            assert!(EnvelopeFormat.decode(&bincode_buf).is_err());
        }
    }

    #[test]
    fn test_bincode_encodes_into_a_single_segment() {
        let msg = KvMessage::PutRequest(PutRequest {
            request_id: 4,
            key: b"k".to_vec(),
            value: b"v".to_vec(),
        });
        let buf = BincodeFormat.encode(&msg).unwrap();
        assert_eq!(buf.segment_count(), 1);
    }

    #[test]
    fn test_format_names_are_stable() {
        assert_eq!(EnvelopeFormat.name(), "envelope");
        assert_eq!(BincodeFormat.name(), "bincode");
    }
}
