//! Opcodes and well-known argument values.
//!
//! The first element of every instruction selects its meaning. Opcodes not
//! listed here are tolerated and ignored by the session layer.

/// Keep-alive. The server sends it periodically and expects it echoed back.
pub const NOP: &str = "nop";

/// Server demands account authentication before the session may proceed.
pub const AUTH: &str = "auth";

/// Node listing. Received but unused.
pub const LIST: &str = "list";

/// Username request (client) or rename notification (server).
pub const RENAME: &str = "rename";

/// Node connection request (client) or acknowledgement (server).
pub const CONNECT: &str = "connect";

/// Account login with a bot token (client) or its result (server).
pub const LOGIN: &str = "login";

/// User joined. Received but unused.
pub const ADDUSER: &str = "adduser";

/// Staff operations. The first argument is a sub-command code.
pub const ADMIN: &str = "admin";

/// Chat message.
pub const CHAT: &str = "chat";

/// `admin` sub-command: log in as staff with a password.
pub const ADMIN_LOGIN: &str = "2";

/// `admin` sub-command: broadcast raw HTML into the chat.
pub const ADMIN_HTML: &str = "21";

/// `rename` target marker: the notification concerns this client.
pub const TARGET_SELF: &str = "0";

/// Success marker used by `connect` and `login` responses.
pub const STATUS_OK: &str = "1";

/// Returns true if the opcode is one the session layer understands.
pub fn is_known(opcode: &str) -> bool {
    matches!(
        opcode,
        NOP | AUTH | LIST | RENAME | CONNECT | LOGIN | ADDUSER | ADMIN | CHAT
    )
}
