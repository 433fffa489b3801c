use std::fmt;

use serde::{Deserialize, Serialize};

/// WebSocket subprotocol spoken by CollabVM servers.
pub const SUBPROTOCOL: &str = "guacamole";

/// `Origin` header sent when an endpoint does not configure one.
pub const DEFAULT_ORIGIN: &str = "https://computernewb.com";

/// One remote VM to join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// WebSocket URL of the server (`ws://` or `wss://`).
    pub url: String,
    /// Node to connect to once named.
    pub node_id: String,
    /// Optional `Origin` header override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            node_id: node_id.into(),
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// The `Origin` header value for this endpoint.
    pub fn origin(&self) -> &str {
        self.origin.as_deref().unwrap_or(DEFAULT_ORIGIN)
    }
}

/// Staff role requested with password elevation. Only used for logging; the
/// server decides the role from the password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Admin,
    Mod,
}

impl StaffRole {
    pub fn as_str(self) -> &'static str {
        match self {
            StaffRole::Admin => "admin",
            StaffRole::Mod => "mod",
        }
    }
}

/// How the bot proves who it is.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Elevate with `admin 2 <password>` after joining the node.
    Password { password: String, role: StaffRole },
    /// Answer the server's `auth` challenge with `login <token>`.
    Token { token: String },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Password { password, role } => f
                .debug_struct("Password")
                .field(
                    "password",
                    &format_args!("<redacted:{} bytes>", password.len()),
                )
                .field("role", role)
                .finish(),
            Credentials::Token { token } => f
                .debug_struct("Token")
                .field("token", &format_args!("<redacted:{} bytes>", token.len()))
                .finish(),
        }
    }
}

/// Settings shared by every session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Display name requested on connect. The server may assign another.
    pub username: String,
    pub credentials: Credentials,
}

impl SessionConfig {
    pub fn new(username: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            username: username.into(),
            credentials,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_deserializes_camel_case() {
        let endpoint: Endpoint = serde_json::from_str(
            r#"{"url":"wss://example.net/vm1","nodeId":"vm1","origin":"https://example.net"}"#,
        )
        .unwrap();
        assert_eq!(endpoint.node_id, "vm1");
        assert_eq!(endpoint.origin(), "https://example.net");

        let bare: Endpoint =
            serde_json::from_str(r#"{"url":"ws://127.0.0.1:6004","nodeId":"vm2"}"#).unwrap();
        assert_eq!(bare.origin, None);
        assert_eq!(bare.origin(), DEFAULT_ORIGIN);
    }

    #[test]
    fn staff_role_parses_lowercase() {
        let role: StaffRole = serde_json::from_str("\"mod\"").unwrap();
        assert_eq!(role, StaffRole::Mod);
        assert_eq!(role.as_str(), "mod");
        assert!(serde_json::from_str::<StaffRole>("\"root\"").is_err());
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let config = SessionConfig::new(
            "EmojiBot",
            Credentials::Password {
                password: "hunter22".to_string(),
                role: StaffRole::Admin,
            },
        );
        let debug = format!("{config:?}");
        assert!(debug.contains("<redacted:8 bytes>"));
        assert!(!debug.contains("hunter22"));

        let token = format!(
            "{:?}",
            Credentials::Token {
                token: "secret-token".to_string()
            }
        );
        assert!(token.contains("<redacted:12 bytes>"));
        assert!(!token.contains("secret-token"));
    }
}
