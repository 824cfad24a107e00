//! Integration tests for the sgkv-core protocol.
//!
//! These tests verify complete round-trip encoding and decoding of every
//! message type through the public API, exercising the codec, the message
//! types, the segment buffers, and the request-id counter together.

use std::sync::Arc;

use sgkv_core::{
    decode_message, encode_message,
    protocol::messages::{GetRequest, GetResponse, PutRequest, PutResponse, ENVELOPE_LEN},
    BincodeFormat, EnvelopeFormat, KvMessage, RequestIdCounter, ResponseStatus, SegmentBuffer,
    WireFormat,
};

/// Encodes a message and decodes it back through the public API. Decode
/// itself enforces that the envelope accounts for every buffer byte.
fn roundtrip(msg: KvMessage) -> KvMessage {
    let buf = encode_message(&msg);
    decode_message(&buf).expect("decode must succeed")
}

#[test]
fn test_roundtrip_get_request() {
    let original = KvMessage::GetRequest(GetRequest {
        request_id: 42,
        key: b"session/abc123".to_vec(),
    });

    assert_eq!(original, roundtrip(original.clone()));
}

#[test]
fn test_roundtrip_get_response_found() {
    let original = KvMessage::GetResponse(GetResponse {
        request_id: 42,
        value: Some(b"opaque bytes \x00\x01\x02".to_vec()),
    });

    assert_eq!(original, roundtrip(original.clone()));
}

#[test]
fn test_roundtrip_get_response_not_found() {
    let original = KvMessage::GetResponse(GetResponse {
        request_id: 43,
        value: None,
    });

    assert_eq!(original, roundtrip(original.clone()));
}

#[test]
fn test_roundtrip_put_request() {
    let original = KvMessage::PutRequest(PutRequest {
        request_id: 44,
        key: b"metrics/cpu".to_vec(),
        value: vec![0xFF; 1024],
    });

    assert_eq!(original, roundtrip(original.clone()));
}

#[test]
fn test_roundtrip_put_response() {
    let original = KvMessage::PutResponse(PutResponse {
        request_id: 44,
        status: ResponseStatus::Ok,
    });

    assert_eq!(original, roundtrip(original.clone()));
}

#[test]
fn test_roundtrip_through_both_wire_formats() {
    let formats: [Arc<dyn WireFormat>; 2] = [Arc::new(EnvelopeFormat), Arc::new(BincodeFormat)];
    let original = KvMessage::PutRequest(PutRequest {
        request_id: 45,
        key: b"format-agnostic".to_vec(),
        value: b"same message either way".to_vec(),
    });

    for format in formats {
        let buf = format.encode(&original).expect("encode must succeed");
        let decoded = format.decode(&buf).expect("decode must succeed");
        assert_eq!(original, decoded, "{} format", format.name());
    }
}

#[test]
fn test_buffer_total_length_matches_envelope_plus_fields() {
    let key = b"a-key";
    let value = b"a-somewhat-longer-value";
    let buf = encode_message(&KvMessage::PutRequest(PutRequest {
        request_id: 1,
        key: key.to_vec(),
        value: value.to_vec(),
    }));

    assert_eq!(buf.total_len(), ENVELOPE_LEN + key.len() + value.len());
}

#[test]
fn test_decode_accepts_every_two_way_split_of_the_bytes() {
    let original = KvMessage::PutRequest(PutRequest {
        request_id: 77,
        key: b"split-point".to_vec(),
        value: b"segmentation must not matter".to_vec(),
    });
    let bytes = encode_message(&original).to_contiguous();

    // Rebuild the same bytes as [0..k][k..] for every split point,
    // including splits inside the envelope and inside the fields.
    for k in 0..=bytes.len() {
        let buf = SegmentBuffer::from_segments(vec![
            bytes[..k].to_vec().into_boxed_slice(),
            bytes[k..].to_vec().into_boxed_slice(),
        ]);
        let decoded = decode_message(&buf)
            .unwrap_or_else(|e| panic!("split at {k} failed to decode: {e}"));
        assert_eq!(original, decoded, "split at {k}");
    }
}

#[test]
fn test_decoded_message_outlives_the_buffer() {
    let original = KvMessage::GetResponse(GetResponse {
        request_id: 3,
        value: Some(b"survives the release".to_vec()),
    });
    let buf = encode_message(&original);

    let decoded = decode_message(&buf).expect("decode must succeed");
    drop(buf);

    // Every field is an owned copy; releasing the buffer cannot touch it.
    assert_eq!(decoded, original);
}

#[test]
fn test_request_ids_from_the_counter_land_in_the_envelope() {
    let counter = RequestIdCounter::new();

    let first = encode_message(&KvMessage::GetRequest(GetRequest {
        request_id: counter.next(),
        key: b"k".to_vec(),
    }))
    .to_contiguous();
    let second = encode_message(&KvMessage::GetRequest(GetRequest {
        request_id: counter.next(),
        key: b"k".to_vec(),
    }))
    .to_contiguous();

    // Correlation ids occupy envelope bytes 4..12, big-endian.
    let id1 = u64::from_be_bytes(first[4..12].try_into().unwrap());
    let id2 = u64::from_be_bytes(second[4..12].try_into().unwrap());

    assert_eq!(id1, 1, "first issued id must be 1");
    assert_eq!(id2, 2, "second issued id must be 2");
}
