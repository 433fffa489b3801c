//! Length-prefixed instruction framing for the CollabVM array protocol.
//!
//! Every instruction is a flat list of strings. On the wire each element is
//! written as `<byte length>.<value>`, elements are separated by `,` and the
//! instruction ends with `;`:
//!
//! ```text
//! 6.rename,7.EmojiMe;
//! ```
//!
//! Boundaries come from the length prefix alone, so values may contain any of
//! the delimiter characters without escaping.

pub mod codec;
pub mod instruction;
pub mod opcode;

pub use codec::{decode, encode};
pub use instruction::Instruction;
pub use opcode::{
    is_known,
    ADDUSER, ADMIN, ADMIN_HTML, ADMIN_LOGIN, AUTH, CHAT, CONNECT, LIST, LOGIN, NOP, RENAME,
    STATUS_OK, TARGET_SELF,
};
