//! Chat commands for cvmbot.
//!
//! - [`catalog`]: the emoji list, fetched once over HTTP and read-only after
//! - [`trigger`]: recognising command invocations in chat lines
//! - [`handler`]: [`EmojiCommands`], the [`CommandDispatcher`] used by the bot
//!
//! [`CommandDispatcher`]: cvmbot_session::CommandDispatcher

pub mod catalog;
pub mod error;
pub mod handler;
pub mod trigger;

pub use catalog::{Emoji, EmojiCatalog};
pub use error::{CatalogError, Result};
pub use handler::{CommandKind, EmojiCommands};
pub use trigger::{parse_invocation, Invocation, TriggerConfig};
