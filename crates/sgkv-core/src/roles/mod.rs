//! The two protocol roles: a correlating client and a stateless server.

pub mod client;
pub mod server;

pub use client::{ClientError, ClientState, KvClient, ResponseOutcome};
pub use server::{KvServer, ServerError};
