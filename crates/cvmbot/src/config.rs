use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use cvmbot_commands::TriggerConfig;
use cvmbot_session::{Credentials, Endpoint, SessionConfig, StaffRole};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How the bot identifies itself to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// Staff password sent with `admin 2` after joining the node.
    Password,
    /// Account token sent with `login` when the server asks for it.
    Token,
}

/// On-disk bot configuration (`config.json`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    pub prefix: String,
    pub vms: Vec<Endpoint>,
    pub auth_type: AuthType,
    #[serde(default)]
    pub admin_password: String,
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_login_as")]
    pub login_as: StaffRole,
    pub username: String,
    pub emojilist_url: String,
    #[serde(default)]
    pub colon_emoji: bool,
}

fn default_login_as() -> StaffRole {
    StaffRole::Admin
}

impl BotConfig {
    /// Read, parse and validate the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prefix.is_empty() {
            return Err(ConfigError::Invalid("prefix must not be empty".to_string()));
        }
        if self.username.is_empty() {
            return Err(ConfigError::Invalid(
                "username must not be empty".to_string(),
            ));
        }
        if self.vms.is_empty() {
            return Err(ConfigError::Invalid("no vms configured".to_string()));
        }
        for (index, vm) in self.vms.iter().enumerate() {
            if !(vm.url.starts_with("ws://") || vm.url.starts_with("wss://")) {
                return Err(ConfigError::Invalid(format!(
                    "vms[{index}].url must be a ws:// or wss:// URL, got {:?}",
                    vm.url
                )));
            }
            if vm.node_id.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "vms[{index}].nodeId must not be empty"
                )));
            }
        }
        match self.auth_type {
            AuthType::Password if self.admin_password.is_empty() => Err(ConfigError::Invalid(
                "authType \"password\" requires adminPassword".to_string(),
            )),
            AuthType::Token if self.bot_token.is_empty() => Err(ConfigError::Invalid(
                "authType \"token\" requires botToken".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn credentials(&self) -> Credentials {
        match self.auth_type {
            AuthType::Password => Credentials::Password {
                password: self.admin_password.clone(),
                role: self.login_as,
            },
            AuthType::Token => Credentials::Token {
                token: self.bot_token.clone(),
            },
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::new(self.username.clone(), self.credentials())
    }

    pub fn trigger(&self) -> TriggerConfig {
        TriggerConfig::new(self.prefix.clone()).with_colon_shorthand(self.colon_emoji)
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("prefix", &self.prefix)
            .field("vms", &self.vms)
            .field("auth_type", &self.auth_type)
            .field(
                "admin_password",
                &format_args!("<redacted:{} bytes>", self.admin_password.len()),
            )
            .field(
                "bot_token",
                &format_args!("<redacted:{} bytes>", self.bot_token.len()),
            )
            .field("login_as", &self.login_as)
            .field("username", &self.username)
            .field("emojilist_url", &self.emojilist_url)
            .field("colon_emoji", &self.colon_emoji)
            .finish()
    }
}
