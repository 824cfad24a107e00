//! Protocol module containing message types, the envelope codec, and the
//! pluggable wire-format seam.

pub mod codec;
pub mod format;
pub mod messages;
pub mod sequence;

pub use codec::{decode_message, encode_message, probe_message_type, CodecError};
pub use format::{BincodeFormat, EnvelopeFormat, WireFormat};
pub use messages::*;
pub use sequence::RequestIdCounter;
