//! Emoji bot for CollabVM servers.
//!
//! The bot joins one or more VMs over the CollabVM WebSocket protocol and
//! answers chat commands. The workspace is layered:
//!
//! - [`frame`]: the length-prefixed array codec used on the wire
//! - [`session`]: the per-connection handshake state machine, the WebSocket
//!   driver and the multi-endpoint supervisor
//! - [`commands`]: the emoji catalog and chat command dispatcher (behind the
//!   `commands` feature)

/// Re-export frame types.
pub mod frame {
    pub use cvmbot_frame::*;
}

/// Re-export session types.
pub mod session {
    pub use cvmbot_session::*;
}

/// Re-export command types (requires `commands` feature).
#[cfg(feature = "commands")]
pub mod commands {
    pub use cvmbot_commands::*;
}
