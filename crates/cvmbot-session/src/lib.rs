//! CollabVM session management.
//!
//! [`Session`] is a sans-IO state machine for one connection: it consumes
//! decoded instructions and returns [`Action`]s. [`connection`] drives a
//! session over a WebSocket, and [`Supervisor`] runs one independent
//! connection per configured endpoint.

pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod session;
pub mod supervisor;

#[cfg(test)]
mod testing;

pub use config::{Credentials, Endpoint, SessionConfig, StaffRole, DEFAULT_ORIGIN, SUBPROTOCOL};
pub use connection::{connect, drive, run_endpoint, SessionEnd};
pub use dispatch::{ChatMessage, CommandDispatcher, NullDispatcher, Privilege};
pub use error::{Result, SessionError, WsError};
pub use session::{Action, CloseReason, Phase, Session};
pub use supervisor::{SessionOutcome, Supervisor};
