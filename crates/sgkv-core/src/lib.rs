//! # sgkv-core
//!
//! Shared library for SGKV containing the scatter-gather buffer types, the
//! key-value wire codec, and the client/server protocol roles.
//!
//! This crate is used by every SGKV binary. It has zero dependencies on
//! network sockets or async runtimes; transports plug in from outside.
//!
//! # Architecture overview (for beginners)
//!
//! SGKV is a tiny key-value protocol built for zero-copy networking stacks,
//! where received data arrives as a *scatter-gather buffer*: a list of
//! byte segments that together form one logical message, without ever
//! being copied into one contiguous allocation.
//!
//! This crate defines:
//!
//! - **`buffer`** – [`SegmentBuffer`], an owned scatter-gather buffer whose
//!   segments are either views into one shared backing allocation or
//!   independently owned, plus a cursor for reading across segment
//!   boundaries. Dropping a buffer releases exactly what it owns.
//!
//! - **`protocol`** – The message types (GET/PUT requests and responses),
//!   the 20-byte envelope codec, and the [`WireFormat`] seam that lets a
//!   deployment swap the hand-written codec for a `serde`-derived one.
//!
//! - **`roles`** – [`KvClient`], a per-request state machine that matches
//!   responses to requests by correlation id, and [`KvServer`], a
//!   stateless decode-execute-encode request handler.
//!
//! - **`store`** – The in-memory key-value table the server executes
//!   against.
//!
//! - **`transport`** – The [`BufferChannel`] trait the roles push owned
//!   buffers through, with an in-process loopback implementation.

pub mod buffer;
pub mod protocol;
pub mod roles;
pub mod store;
pub mod transport;

// Re-export the most-used types at the crate root so callers can write
// `sgkv_core::SegmentBuffer` instead of `sgkv_core::buffer::segment::SegmentBuffer`.
pub use buffer::reader::{ReadUnderrun, SegmentReader};
pub use buffer::segment::{BufferError, OwnershipMode, SegmentBuffer};
pub use protocol::codec::{decode_message, encode_message, probe_message_type, CodecError};
pub use protocol::format::{BincodeFormat, EnvelopeFormat, WireFormat};
pub use protocol::messages::{KvMessage, MessageType, RequestId, ResponseStatus};
pub use protocol::sequence::RequestIdCounter;
pub use roles::client::{ClientError, ClientState, KvClient, ResponseOutcome};
pub use roles::server::{KvServer, ServerError};
pub use store::MemoryStore;
pub use transport::{BufferChannel, ChannelError, LoopbackChannel};
