use std::fmt;
use std::sync::Arc;

use cvmbot_frame::{is_known, Instruction, AUTH, CHAT, CONNECT, LOGIN, NOP, RENAME, STATUS_OK, TARGET_SELF};

use crate::config::{Credentials, SessionConfig};
use crate::dispatch::{ChatMessage, Privilege};

const DEFAULT_LOGIN_ERROR: &str = "Unknown error";

/// Handshake progress of a session.
///
/// ```text
/// Opening → NamePending → (AuthPending) → ConnectPending → Ready → Closed
/// ```
///
/// `AuthPending` is entered only when the server sends `auth`. Any phase may
/// move to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Opening,
    NamePending,
    AuthPending,
    ConnectPending,
    Ready,
    Closed,
}

/// Why the session closed its own socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Server demanded account authentication but no bot token is configured.
    AuthenticationRequired,
    /// Server rejected the bot token.
    LoginRejected(String),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::AuthenticationRequired => {
                write!(f, "server requires account authentication")
            }
            CloseReason::LoginRejected(reason) => write!(f, "bot token login failed: {reason}"),
        }
    }
}

/// Side effects requested by the state machine, to be executed in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Encode and send an instruction.
    Send(Instruction),
    /// Hand a chat line to the command dispatcher and send its replies.
    Dispatch(ChatMessage),
    /// Close the socket. Nothing else will be requested afterwards.
    Close(CloseReason),
}

/// Per-connection handshake state machine.
///
/// Does no I/O. Feed it `on_open`, every decoded instruction, and finally
/// `on_closed`; execute the returned actions in order.
pub struct Session {
    config: Arc<SessionConfig>,
    node_id: String,
    phase: Phase,
    assigned_username: Option<String>,
    privilege: Privilege,
    /// This session answered an `auth` challenge.
    authenticated: bool,
    /// A `login` is outstanding.
    awaiting_authentication: bool,
    /// The name was acknowledged while a `login` was outstanding; `connect`
    /// must follow a successful login.
    awaiting_node_connect: bool,
    connect_sent: bool,
}

impl Session {
    pub fn new(config: Arc<SessionConfig>, node_id: impl Into<String>) -> Self {
        Self {
            config,
            node_id: node_id.into(),
            phase: Phase::Opening,
            assigned_username: None,
            privilege: Privilege::None,
            authenticated: false,
            awaiting_authentication: false,
            awaiting_node_connect: false,
            connect_sent: false,
        }
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn privilege(&self) -> Privilege {
        self.privilege
    }

    /// Name confirmed by the server, if any yet.
    pub fn assigned_username(&self) -> Option<&str> {
        self.assigned_username.as_deref()
    }

    pub fn is_awaiting_authentication(&self) -> bool {
        self.awaiting_authentication
    }

    pub fn is_awaiting_node_connect(&self) -> bool {
        self.awaiting_node_connect
    }

    /// The socket is open: request the configured name.
    pub fn on_open(&mut self) -> Vec<Action> {
        if self.phase != Phase::Opening {
            return Vec::new();
        }
        tracing::info!(username = %self.config.username, "requesting username");
        self.phase = Phase::NamePending;
        vec![Action::Send(Instruction::rename(self.config.username.clone()))]
    }

    /// React to one decoded instruction.
    pub fn on_instruction(&mut self, instruction: &Instruction) -> Vec<Action> {
        if self.phase == Phase::Closed {
            return Vec::new();
        }

        match instruction.opcode() {
            NOP => vec![Action::Send(Instruction::nop())],
            AUTH => self.on_auth(),
            RENAME if instruction.get(0) == Some(TARGET_SELF) => self.on_rename_self(instruction),
            LOGIN => self.on_login(instruction),
            CONNECT => self.on_connect(instruction),
            CHAT => self.on_chat(instruction),
            opcode if is_known(opcode) => {
                tracing::trace!(opcode, "ignoring instruction");
                Vec::new()
            }
            opcode => {
                tracing::debug!(opcode, args = instruction.args().len(), "unknown opcode");
                Vec::new()
            }
        }
    }

    /// The socket closed or failed.
    pub fn on_closed(&mut self) {
        if self.phase != Phase::Closed {
            tracing::debug!(phase = ?self.phase, "session closed");
            self.phase = Phase::Closed;
        }
    }

    fn on_auth(&mut self) -> Vec<Action> {
        if self.authenticated {
            tracing::debug!("duplicate auth challenge ignored");
            return Vec::new();
        }

        match &self.config.credentials {
            Credentials::Token { token } => {
                tracing::info!("server requires account authentication, logging in with bot token");
                self.authenticated = true;
                self.awaiting_authentication = true;
                self.privilege = Privilege::Pending;
                self.phase = Phase::AuthPending;
                vec![Action::Send(Instruction::login(token.clone()))]
            }
            Credentials::Password { .. } => {
                tracing::error!(
                    "server requires account authentication (bot token); \
                     set authType to \"token\" and provide a valid botToken"
                );
                self.close(CloseReason::AuthenticationRequired)
            }
        }
    }

    fn on_rename_self(&mut self, instruction: &Instruction) -> Vec<Action> {
        let name = instruction
            .get(2)
            .unwrap_or(self.config.username.as_str())
            .to_string();
        tracing::info!(username = %name, "username assigned");
        self.assigned_username = Some(name);

        if self.awaiting_authentication {
            tracing::debug!("deferring node connect until authentication resolves");
            self.awaiting_node_connect = true;
            return Vec::new();
        }
        self.request_node_connect()
    }

    fn on_login(&mut self, instruction: &Instruction) -> Vec<Action> {
        let succeeded = instruction.get(0) == Some(STATUS_OK);
        if succeeded && !self.awaiting_authentication {
            tracing::debug!("unsolicited login success ignored");
            return Vec::new();
        }

        if !succeeded {
            let reason = instruction
                .get(1)
                .filter(|reason| !reason.is_empty())
                .unwrap_or(DEFAULT_LOGIN_ERROR);
            tracing::error!(reason, "bot token login failed");
            return self.close(CloseReason::LoginRejected(reason.to_string()));
        }

        tracing::info!("logged in with bot token");
        self.awaiting_authentication = false;
        let mut actions = Vec::new();
        if self.awaiting_node_connect {
            self.awaiting_node_connect = false;
            actions.extend(self.request_node_connect());
        }
        self.privilege = Privilege::Elevated;
        self.phase = Phase::Ready;
        actions
    }

    fn on_connect(&mut self, instruction: &Instruction) -> Vec<Action> {
        if instruction.get(0) != Some(STATUS_OK) {
            tracing::warn!(
                status = instruction.get(0).unwrap_or(""),
                node = %self.node_id,
                "node connection refused"
            );
            return Vec::new();
        }

        if self.awaiting_authentication {
            // Login result still decides the privilege.
            tracing::debug!("node connected while authentication is pending");
            return Vec::new();
        }

        let mut actions = Vec::new();
        if self.authenticated {
            self.privilege = Privilege::Elevated;
        } else if let Credentials::Password { password, role } = &self.config.credentials {
            if !self.privilege.is_elevated() {
                tracing::info!(role = role.as_str(), "logging in as staff");
                actions.push(Action::Send(Instruction::admin_login(password.clone())));
                // The server does not confirm elevation distinctly; assume it worked.
                self.privilege = Privilege::Elevated;
            }
        }

        if self.phase != Phase::Ready {
            tracing::info!(node = %self.node_id, "connected to node");
        }
        self.phase = Phase::Ready;
        actions
    }

    fn on_chat(&self, instruction: &Instruction) -> Vec<Action> {
        match (instruction.get(0), instruction.get(1)) {
            (Some(sender), Some(message)) if !sender.is_empty() && !message.is_empty() => {
                vec![Action::Dispatch(ChatMessage {
                    node_id: self.node_id.clone(),
                    sender: sender.to_string(),
                    message: message.to_string(),
                    privilege: self.privilege,
                })]
            }
            _ => Vec::new(),
        }
    }

    fn request_node_connect(&mut self) -> Vec<Action> {
        if self.connect_sent {
            return Vec::new();
        }
        tracing::debug!(node = %self.node_id, "requesting node connection");
        self.connect_sent = true;
        self.phase = Phase::ConnectPending;
        vec![Action::Send(Instruction::connect(self.node_id.clone()))]
    }

    fn close(&mut self, reason: CloseReason) -> Vec<Action> {
        self.phase = Phase::Closed;
        vec![Action::Close(reason)]
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("node_id", &self.node_id)
            .field("phase", &self.phase)
            .field("assigned_username", &self.assigned_username)
            .field("privilege", &self.privilege)
            .field("awaiting_authentication", &self.awaiting_authentication)
            .field("awaiting_node_connect", &self.awaiting_node_connect)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaffRole;

    fn token_config() -> Arc<SessionConfig> {
        Arc::new(SessionConfig::new(
            "EmojiBot",
            Credentials::Token {
                token: "bot-token".to_string(),
            },
        ))
    }

    fn password_config() -> Arc<SessionConfig> {
        Arc::new(SessionConfig::new(
            "EmojiBot",
            Credentials::Password {
                password: "hunter2".to_string(),
                role: StaffRole::Admin,
            },
        ))
    }

    fn inst(elements: &[&str]) -> Instruction {
        Instruction::from_elements(elements.iter().map(|e| e.to_string()).collect()).unwrap()
    }

    fn sent(actions: &[Action]) -> Vec<Instruction> {
        actions
            .iter()
            .filter_map(|action| match action {
                Action::Send(instruction) => Some(instruction.clone()),
                _ => None,
            })
            .collect()
    }

    fn count_connects(actions: &[Action]) -> usize {
        sent(actions)
            .iter()
            .filter(|i| i.opcode() == CONNECT)
            .count()
    }

    #[test]
    fn open_requests_username() {
        let mut session = Session::new(password_config(), "vm1");
        let actions = session.on_open();
        assert_eq!(actions, vec![Action::Send(Instruction::rename("EmojiBot"))]);
        assert_eq!(session.phase(), Phase::NamePending);
        assert!(session.on_open().is_empty());
    }

    #[test]
    fn nop_is_echoed_in_any_phase() {
        let mut session = Session::new(password_config(), "vm1");
        assert_eq!(
            session.on_instruction(&inst(&["nop"])),
            vec![Action::Send(Instruction::nop())]
        );
        session.on_open();
        assert_eq!(
            session.on_instruction(&inst(&["nop"])),
            vec![Action::Send(Instruction::nop())]
        );
        assert_eq!(session.phase(), Phase::NamePending);
    }

    #[test]
    fn rename_ack_without_auth_connects_immediately() {
        let mut session = Session::new(password_config(), "vm1");
        session.on_open();

        let actions = session.on_instruction(&inst(&["rename", "0", "0", "EmojiBot123", "0"]));
        assert_eq!(actions, vec![Action::Send(Instruction::connect("vm1"))]);
        assert_eq!(session.phase(), Phase::ConnectPending);
        assert_eq!(session.assigned_username(), Some("EmojiBot123"));
    }

    #[test]
    fn rename_of_other_user_is_ignored() {
        let mut session = Session::new(password_config(), "vm1");
        session.on_open();
        let actions = session.on_instruction(&inst(&["rename", "1", "alice", "bob"]));
        assert!(actions.is_empty());
        assert_eq!(session.assigned_username(), None);
        assert_eq!(session.phase(), Phase::NamePending);
    }

    #[test]
    fn rename_ack_without_name_keeps_requested_name() {
        let mut session = Session::new(password_config(), "vm1");
        session.on_open();
        session.on_instruction(&inst(&["rename", "0", "0"]));
        assert_eq!(session.assigned_username(), Some("EmojiBot"));
    }

    #[test]
    fn auth_before_rename_ack_defers_connect_until_login() {
        let mut session = Session::new(token_config(), "vm1");
        session.on_open();

        let actions = session.on_instruction(&inst(&["auth", "https://auth.example"]));
        assert_eq!(actions, vec![Action::Send(Instruction::login("bot-token"))]);
        assert_eq!(session.phase(), Phase::AuthPending);
        assert_eq!(session.privilege(), Privilege::Pending);

        let actions = session.on_instruction(&inst(&["rename", "0", "0", "EmojiBot"]));
        assert_eq!(count_connects(&actions), 0);
        assert!(session.is_awaiting_node_connect());
        assert_eq!(session.phase(), Phase::AuthPending);

        let actions = session.on_instruction(&inst(&["login", "1"]));
        assert_eq!(actions, vec![Action::Send(Instruction::connect("vm1"))]);
        assert!(!session.is_awaiting_node_connect());
        assert!(!session.is_awaiting_authentication());
        assert_eq!(session.privilege(), Privilege::Elevated);
        assert_eq!(session.phase(), Phase::Ready);

        // Connect ack after login must not send a second connect or an admin login.
        let actions = session.on_instruction(&inst(&["connect", "1"]));
        assert!(actions.is_empty());
        assert_eq!(session.phase(), Phase::Ready);
        assert_eq!(session.privilege(), Privilege::Elevated);
    }

    #[test]
    fn login_success_before_rename_ack_connects_on_ack() {
        let mut session = Session::new(token_config(), "vm1");
        session.on_open();
        session.on_instruction(&inst(&["auth", "https://auth.example"]));

        let actions = session.on_instruction(&inst(&["login", "1"]));
        assert_eq!(count_connects(&actions), 0);
        assert_eq!(session.privilege(), Privilege::Elevated);

        let actions = session.on_instruction(&inst(&["rename", "0", "0", "EmojiBot"]));
        assert_eq!(actions, vec![Action::Send(Instruction::connect("vm1"))]);
    }

    #[test]
    fn exactly_one_connect_across_handshake() {
        let mut session = Session::new(token_config(), "vm1");
        let mut all = session.on_open();
        for frame in [
            inst(&["auth", "x"]),
            inst(&["rename", "0", "0", "EmojiBot"]),
            inst(&["login", "1"]),
            inst(&["rename", "0", "0", "EmojiBot2"]),
            inst(&["connect", "1"]),
        ] {
            all.extend(session.on_instruction(&frame));
        }
        assert_eq!(count_connects(&all), 1);
    }

    #[test]
    fn auth_without_token_closes() {
        let mut session = Session::new(password_config(), "vm1");
        session.on_open();

        let actions = session.on_instruction(&inst(&["auth", "https://auth.example"]));
        assert_eq!(
            actions,
            vec![Action::Close(CloseReason::AuthenticationRequired)]
        );
        assert_eq!(session.phase(), Phase::Closed);

        // Nothing further happens once closed, not even nop echoes.
        assert!(session.on_instruction(&inst(&["nop"])).is_empty());
        assert!(session
            .on_instruction(&inst(&["rename", "0", "0", "EmojiBot"]))
            .is_empty());
    }

    #[test]
    fn login_failure_closes_with_reason() {
        let mut session = Session::new(token_config(), "vm1");
        session.on_open();
        session.on_instruction(&inst(&["auth", "x"]));

        let actions = session.on_instruction(&inst(&["login", "0", "Invalid token"]));
        assert_eq!(
            actions,
            vec![Action::Close(CloseReason::LoginRejected(
                "Invalid token".to_string()
            ))]
        );
        assert_eq!(session.phase(), Phase::Closed);
        assert_ne!(session.privilege(), Privilege::Elevated);
    }

    #[test]
    fn login_failure_without_reason_uses_default() {
        let mut session = Session::new(token_config(), "vm1");
        session.on_open();
        session.on_instruction(&inst(&["auth", "x"]));

        let actions = session.on_instruction(&inst(&["login", "0"]));
        assert_eq!(
            actions,
            vec![Action::Close(CloseReason::LoginRejected(
                DEFAULT_LOGIN_ERROR.to_string()
            ))]
        );
    }

    #[test]
    fn unsolicited_login_success_is_ignored() {
        let mut session = Session::new(token_config(), "vm1");
        session.on_open();
        assert!(session.on_instruction(&inst(&["login", "1"])).is_empty());
        assert_eq!(session.privilege(), Privilege::None);
        assert_eq!(session.phase(), Phase::NamePending);
    }

    #[test]
    fn unsolicited_login_failure_closes() {
        let mut session = Session::new(password_config(), "vm1");
        session.on_open();
        let actions = session.on_instruction(&inst(&["login", "0", "Session expired"]));
        assert_eq!(
            actions,
            vec![Action::Close(CloseReason::LoginRejected(
                "Session expired".to_string()
            ))]
        );
        assert_eq!(session.phase(), Phase::Closed);
        assert!(session.on_instruction(&inst(&["nop"])).is_empty());
    }

    #[test]
    fn password_mode_elevates_optimistically_on_connect_ack() {
        let mut session = Session::new(password_config(), "vm1");
        session.on_open();
        session.on_instruction(&inst(&["rename", "0", "0", "EmojiBot"]));
        assert_eq!(session.privilege(), Privilege::None);

        let actions = session.on_instruction(&inst(&["connect", "1", "1", "1", "0"]));
        assert_eq!(
            actions,
            vec![Action::Send(Instruction::admin_login("hunter2"))]
        );
        assert_eq!(session.privilege(), Privilege::Elevated);
        assert_eq!(session.phase(), Phase::Ready);

        // A repeated ack does not resend the password.
        assert!(session.on_instruction(&inst(&["connect", "1"])).is_empty());
    }

    #[test]
    fn token_mode_without_auth_challenge_stays_unprivileged() {
        let mut session = Session::new(token_config(), "vm1");
        session.on_open();
        session.on_instruction(&inst(&["rename", "0", "0", "EmojiBot"]));
        let actions = session.on_instruction(&inst(&["connect", "1"]));
        assert!(actions.is_empty());
        assert_eq!(session.phase(), Phase::Ready);
        assert_eq!(session.privilege(), Privilege::None);
    }

    #[test]
    fn connect_ack_during_pending_login_waits_for_login() {
        let mut session = Session::new(token_config(), "vm1");
        session.on_open();
        session.on_instruction(&inst(&["rename", "0", "0", "EmojiBot"]));
        session.on_instruction(&inst(&["auth", "x"]));
        assert_eq!(session.phase(), Phase::AuthPending);

        assert!(session.on_instruction(&inst(&["connect", "1"])).is_empty());
        assert_eq!(session.privilege(), Privilege::Pending);
        assert_eq!(session.phase(), Phase::AuthPending);

        let actions = session.on_instruction(&inst(&["login", "1"]));
        assert_eq!(count_connects(&actions), 0);
        assert_eq!(session.privilege(), Privilege::Elevated);
        assert_eq!(session.phase(), Phase::Ready);
    }

    #[test]
    fn refused_connect_changes_nothing() {
        let mut session = Session::new(password_config(), "vm1");
        session.on_open();
        session.on_instruction(&inst(&["rename", "0", "0", "EmojiBot"]));
        assert!(session.on_instruction(&inst(&["connect", "0"])).is_empty());
        assert_eq!(session.phase(), Phase::ConnectPending);
        assert_eq!(session.privilege(), Privilege::None);
    }

    #[test]
    fn chat_is_forwarded_with_current_privilege() {
        let mut session = Session::new(password_config(), "vm1");
        session.on_open();

        // Before Ready: still forwarded.
        let actions = session.on_instruction(&inst(&["chat", "alice", "!help"]));
        assert_eq!(
            actions,
            vec![Action::Dispatch(ChatMessage {
                node_id: "vm1".to_string(),
                sender: "alice".to_string(),
                message: "!help".to_string(),
                privilege: Privilege::None,
            })]
        );

        session.on_instruction(&inst(&["rename", "0", "0", "EmojiBot"]));
        session.on_instruction(&inst(&["connect", "1"]));
        let actions = session.on_instruction(&inst(&["chat", "bob", "hello"]));
        match actions.as_slice() {
            [Action::Dispatch(chat)] => assert_eq!(chat.privilege, Privilege::Elevated),
            other => panic!("unexpected actions: {other:?}"),
        }
    }

    #[test]
    fn chat_without_sender_or_message_is_dropped() {
        let mut session = Session::new(password_config(), "vm1");
        assert!(session.on_instruction(&inst(&["chat"])).is_empty());
        assert!(session.on_instruction(&inst(&["chat", "alice"])).is_empty());
        assert!(session.on_instruction(&inst(&["chat", "", "hi"])).is_empty());
        assert!(session.on_instruction(&inst(&["chat", "alice", ""])).is_empty());
    }

    #[test]
    fn unused_opcodes_are_ignored() {
        let mut session = Session::new(password_config(), "vm1");
        session.on_open();
        for frame in [
            inst(&["list", "vm1", "Windows XP", "thumb"]),
            inst(&["adduser", "1", "alice", "0"]),
            inst(&["admin", "0", "1"]),
            inst(&["size", "0", "1024", "768"]),
        ] {
            assert!(session.on_instruction(&frame).is_empty());
        }
        assert_eq!(session.phase(), Phase::NamePending);
    }

    #[test]
    fn on_closed_is_terminal() {
        let mut session = Session::new(password_config(), "vm1");
        session.on_open();
        session.on_closed();
        assert_eq!(session.phase(), Phase::Closed);
        assert!(session.on_instruction(&inst(&["nop"])).is_empty());
        assert!(session.on_open().is_empty());
    }
}
