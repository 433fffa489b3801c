use cvmbot_frame::Instruction;

/// Privilege of the bot's own session, as far as the bot knows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Privilege {
    /// Plain guest.
    #[default]
    None,
    /// Token login sent, result not yet received.
    Pending,
    /// Logged in with a token, or staff elevation requested.
    Elevated,
}

impl Privilege {
    pub fn is_elevated(self) -> bool {
        self == Privilege::Elevated
    }
}

/// A chat line received on a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Node of the session that received the message.
    pub node_id: String,
    pub sender: String,
    pub message: String,
    /// Session privilege at the time the message arrived.
    pub privilege: Privilege,
}

/// Turns chat lines into outbound instructions.
///
/// Called for every chat line a session receives, in arrival order. Lines
/// that are not commands must produce no instructions. Commands that need an
/// elevated session must answer with a visible denial instead of being
/// dropped.
pub trait CommandDispatcher: Send + Sync {
    fn dispatch(&self, chat: &ChatMessage) -> Vec<Instruction>;
}

/// Dispatcher that never replies.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDispatcher;

impl CommandDispatcher for NullDispatcher {
    fn dispatch(&self, _chat: &ChatMessage) -> Vec<Instruction> {
        Vec::new()
    }
}
