//! Server role: stateless per-request handling over an in-memory store.
//!
//! [`KvServer::handle_request`] is the whole loop body: take ownership of
//! a request buffer, decode it, run the operation against the store, and
//! hand back an owned response buffer. The request buffer is released
//! inside the call — decode copies the key and value out, so nothing the
//! store keeps ever aliases transport memory.
//!
//! A GET for an absent key is a normal outcome and produces a not-found
//! response; only undecodable input or a non-request message is an error.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::buffer::segment::SegmentBuffer;
use crate::protocol::codec::CodecError;
use crate::protocol::format::WireFormat;
use crate::protocol::messages::{
    GetResponse, KvMessage, MessageType, PutResponse, ResponseStatus,
};
use crate::store::MemoryStore;

/// Errors surfaced by the server role.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServerError {
    /// The buffer did not decode as a message.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The buffer decoded to a response type; servers only accept requests.
    #[error("received a {0:?}, which is not a request")]
    NotARequest(MessageType),
}

/// The server role.
///
/// Holds the key-value table and a shared [`WireFormat`]; both ends of a
/// conversation must be constructed with the same format.
pub struct KvServer {
    format: Arc<dyn WireFormat>,
    store: MemoryStore,
}

impl KvServer {
    /// Creates a server with an empty store.
    pub fn new(format: Arc<dyn WireFormat>) -> Self {
        Self::with_store(format, MemoryStore::new())
    }

    /// Creates a server over an existing store, e.g. one pre-seeded for a
    /// benchmark run.
    pub fn with_store(format: Arc<dyn WireFormat>, store: MemoryStore) -> Self {
        Self { format, store }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Consumes one request buffer and produces the response buffer.
    ///
    /// GET looks up the key and answers with the value or a not-found
    /// status. PUT inserts or overwrites and answers with an ok status.
    /// Both responses echo the request's correlation id.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Codec`] when the buffer is not a well-formed
    /// message, or [`ServerError::NotARequest`] when it decodes to a
    /// response type. No response buffer is produced for a failed request;
    /// transports decide whether to drop or close.
    pub fn handle_request(
        &mut self,
        request: SegmentBuffer,
    ) -> Result<SegmentBuffer, ServerError> {
        let msg = self.format.decode(&request)?;
        drop(request); // fields are owned copies; the request buffer ends here

        let response = match msg {
            KvMessage::GetRequest(req) => {
                let value = self.store.get(&req.key).map(<[u8]>::to_vec);
                debug!(
                    "request {}: get {} ({} byte key)",
                    req.request_id,
                    if value.is_some() { "hit" } else { "miss" },
                    req.key.len()
                );
                KvMessage::GetResponse(GetResponse {
                    request_id: req.request_id,
                    value,
                })
            }
            KvMessage::PutRequest(req) => {
                debug!(
                    "request {}: put ({} byte key, {} byte value)",
                    req.request_id,
                    req.key.len(),
                    req.value.len()
                );
                self.store.put(req.key, req.value);
                KvMessage::PutResponse(PutResponse {
                    request_id: req.request_id,
                    status: ResponseStatus::Ok,
                })
            }
            other => return Err(ServerError::NotARequest(other.message_type())),
        };

        Ok(self.format.encode(&response)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
