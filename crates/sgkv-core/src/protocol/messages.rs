//! Typed KV protocol messages.
//!
//! Four message types cover the whole protocol: a GET or PUT request and
//! its response. Every message carries a caller-assigned correlation id
//! (the *request id*) that ties a response back to the request that
//! produced it; the codec treats the id as opaque. Keys and values are raw
//! byte strings — length-prefixed on the wire, never terminated — so
//! embedded zero bytes survive a round trip exactly.

use serde::{Deserialize, Serialize};

// ── Protocol constants ────────────────────────────────────────────────────────

/// Current wire format version byte.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Size of the fixed envelope that starts every encoded message, in bytes.
pub const ENVELOPE_LEN: usize = 20;

/// Caller-assigned correlation id tying a response to its request.
pub type RequestId = u64;

// ── Message type codes ────────────────────────────────────────────────────────

/// Wire tags for the four message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageType {
    GetRequest = 0x01,
    GetResponse = 0x02,
    PutRequest = 0x03,
    PutResponse = 0x04,
}

impl TryFrom<u8> for MessageType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0x01 => Ok(MessageType::GetRequest),
            0x02 => Ok(MessageType::GetResponse),
            0x03 => Ok(MessageType::PutRequest),
            0x04 => Ok(MessageType::PutResponse),
            _ => Err(()),
        }
    }
}

impl MessageType {
    /// True for the two request tags.
    pub fn is_request(self) -> bool {
        matches!(self, MessageType::GetRequest | MessageType::PutRequest)
    }

    /// The response tag a request of this type expects back.
    pub fn response_type(self) -> Option<MessageType> {
        match self {
            MessageType::GetRequest => Some(MessageType::GetResponse),
            MessageType::PutRequest => Some(MessageType::PutResponse),
            MessageType::GetResponse | MessageType::PutResponse => None,
        }
    }
}

// ── Response status ───────────────────────────────────────────────────────────

/// Outcome byte carried by responses.
///
/// `NotFound` is a normal protocol outcome for a GET on an absent key, not
/// an error: the message still decodes and completes the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ResponseStatus {
    Ok = 0x00,
    NotFound = 0x01,
}

impl TryFrom<u8> for ResponseStatus {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0x00 => Ok(ResponseStatus::Ok),
            0x01 => Ok(ResponseStatus::NotFound),
            _ => Err(()),
        }
    }
}

// ── Per-message payload structs ───────────────────────────────────────────────

/// GET_REQUEST (0x01): look up a value by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRequest {
    /// Correlation id echoed by the response.
    pub request_id: RequestId,
    /// Key to look up. Binary-safe; may be empty.
    pub key: Vec<u8>,
}

/// GET_RESPONSE (0x02): the result of a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetResponse {
    /// Correlation id of the request being answered.
    pub request_id: RequestId,
    /// The stored value, or `None` when the key was absent. An empty
    /// value and an absent key are distinct outcomes on the wire.
    pub value: Option<Vec<u8>>,
}

/// PUT_REQUEST (0x03): insert or overwrite a key's value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutRequest {
    /// Correlation id echoed by the response.
    pub request_id: RequestId,
    /// Key to write. Binary-safe; may be empty.
    pub key: Vec<u8>,
    /// Value to store. Binary-safe; may be empty.
    pub value: Vec<u8>,
}

/// PUT_RESPONSE (0x04): acknowledgement of a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutResponse {
    /// Correlation id of the request being answered.
    pub request_id: RequestId,
    /// Outcome of the store operation.
    pub status: ResponseStatus,
}

// ── Top-level message enum ────────────────────────────────────────────────────

/// All valid KV messages, discriminated by type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KvMessage {
    GetRequest(GetRequest),
    GetResponse(GetResponse),
    PutRequest(PutRequest),
    PutResponse(PutResponse),
}

impl KvMessage {
    /// Returns the [`MessageType`] discriminant for this message.
    pub fn message_type(&self) -> MessageType {
        match self {
            KvMessage::GetRequest(_) => MessageType::GetRequest,
            KvMessage::GetResponse(_) => MessageType::GetResponse,
            KvMessage::PutRequest(_) => MessageType::PutRequest,
            KvMessage::PutResponse(_) => MessageType::PutResponse,
        }
    }

    /// Returns the correlation id every message variant carries.
    pub fn request_id(&self) -> RequestId {
        match self {
            KvMessage::GetRequest(m) => m.request_id,
            KvMessage::GetResponse(m) => m.request_id,
            KvMessage::PutRequest(m) => m.request_id,
            KvMessage::PutResponse(m) => m.request_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_round_trips_through_its_byte() {
        for ty in [
            MessageType::GetRequest,
            MessageType::GetResponse,
            MessageType::PutRequest,
            MessageType::PutResponse,
        ] {
            assert_eq!(MessageType::try_from(ty as u8), Ok(ty));
        }
    }

    #[test]
    fn test_unassigned_type_byte_is_rejected() {
        assert_eq!(MessageType::try_from(0x00), Err(()));
        assert_eq!(MessageType::try_from(0x05), Err(()));
        assert_eq!(MessageType::try_from(0xFF), Err(()));
    }

    #[test]
    fn test_request_tags_know_their_response_tag() {
        assert_eq!(
            MessageType::GetRequest.response_type(),
            Some(MessageType::GetResponse)
        );
        assert_eq!(
            MessageType::PutRequest.response_type(),
            Some(MessageType::PutResponse)
        );
        assert_eq!(MessageType::GetResponse.response_type(), None);
        assert!(MessageType::GetRequest.is_request());
        assert!(!MessageType::PutResponse.is_request());
    }

    #[test]
    fn test_every_variant_reports_its_request_id() {
        let id = 42;
        let messages = [
            KvMessage::GetRequest(GetRequest {
                request_id: id,
                key: b"k".to_vec(),
            }),
            KvMessage::GetResponse(GetResponse {
                request_id: id,
                value: Some(b"v".to_vec()),
            }),
            KvMessage::PutRequest(PutRequest {
                request_id: id,
                key: b"k".to_vec(),
                value: b"v".to_vec(),
            }),
            KvMessage::PutResponse(PutResponse {
                request_id: id,
                status: ResponseStatus::Ok,
            }),
        ];
        for msg in &messages {
            assert_eq!(msg.request_id(), id);
        }
    }
}
