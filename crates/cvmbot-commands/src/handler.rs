use std::sync::Arc;

use cvmbot_frame::Instruction;
use cvmbot_session::{ChatMessage, CommandDispatcher};

use crate::catalog::EmojiCatalog;
use crate::trigger::{parse_invocation, TriggerConfig};

const BOX_STYLE: &str =
    "background:#222;color:#fff;padding:8px 12px;border-radius:8px;font-family:sans-serif;";
const LIST_STYLE: &str = "margin:4px 0 0 16px;padding:0;";

/// Commands understood by [`EmojiCommands`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Help,
    EmojiList,
    Emoji,
}

impl CommandKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "help" => Some(Self::Help),
            "emojilist" => Some(Self::EmojiList),
            "emoji" => Some(Self::Emoji),
            _ => None,
        }
    }

    /// Whether the bot's session must be elevated to run the command.
    ///
    /// Posting raw HTML for an emoji is a staff-only server operation.
    pub fn requires_elevation(self) -> bool {
        matches!(self, Self::Emoji)
    }

    fn title(self) -> &'static str {
        match self {
            Self::Help => "Help",
            Self::EmojiList => "Emoji list",
            Self::Emoji => "Emoji",
        }
    }
}

/// Dispatcher for the emoji bot: `help`, `emojilist` and `emoji <name>`.
#[derive(Debug, Clone)]
pub struct EmojiCommands {
    trigger: TriggerConfig,
    catalog: Arc<EmojiCatalog>,
}

impl EmojiCommands {
    pub fn new(trigger: TriggerConfig, catalog: Arc<EmojiCatalog>) -> Self {
        Self { trigger, catalog }
    }

    fn help(&self) -> Vec<Instruction> {
        let prefix = escape_html(&self.trigger.prefix);
        let html = format!(
            "<div style='{BOX_STYLE}'><b>EmojiBot Commands:</b><ul style='{LIST_STYLE}'>\
             <li><b>{prefix}help</b> - Show this help</li>\
             <li><b>{prefix}emojilist</b> - List available emojis</li>\
             <li><b>{prefix}emoji &lt;name&gt;</b> - Send an emoji</li>\
             </ul></div>"
        );
        vec![Instruction::admin_html(html)]
    }

    fn emoji_list(&self) -> Vec<Instruction> {
        if self.catalog.is_empty() {
            return vec![Instruction::chat("No emojis loaded.")];
        }

        let items: String = self
            .catalog
            .iter()
            .map(|emoji| {
                let name = escape_html(&emoji.name);
                format!(
                    "<li><b>{name}</b>: {} <img src='{}' alt='{name}' style='height:20px;vertical-align:middle;'></li>",
                    escape_html(&emoji.description),
                    escape_html(&emoji.file),
                )
            })
            .collect();
        let html = format!(
            "<div style='{BOX_STYLE}'><b>Available Emojis:</b><ul style='{LIST_STYLE}'>{items}</ul></div>"
        );
        vec![Instruction::admin_html(html)]
    }

    fn emoji(&self, chat: &ChatMessage, name: Option<&str>) -> Vec<Instruction> {
        let prefix = &self.trigger.prefix;
        let Some(name) = name else {
            return vec![Instruction::chat(format!("Usage: {prefix}emoji <name>"))];
        };
        let Some(emoji) = self.catalog.get(name) else {
            return vec![Instruction::chat(format!(
                "Emoji not found. Use {prefix}emojilist to see available emojis."
            ))];
        };

        tracing::info!(
            node = %chat.node_id,
            emoji = %emoji.name,
            sender = %chat.sender,
            "sending emoji"
        );
        let html = format!(
            "<img src='{}' alt='{}' style='height:32px;'>",
            escape_html(&emoji.file),
            escape_html(&emoji.name)
        );
        vec![Instruction::admin_html(html)]
    }
}

impl CommandDispatcher for EmojiCommands {
    fn dispatch(&self, chat: &ChatMessage) -> Vec<Instruction> {
        let Some(invocation) = parse_invocation(&chat.message, &self.trigger) else {
            return Vec::new();
        };
        let Some(kind) = CommandKind::from_name(&invocation.name) else {
            tracing::debug!(command = %invocation.name, sender = %chat.sender, "unknown command");
            return Vec::new();
        };

        if kind.requires_elevation() && !chat.privilege.is_elevated() {
            tracing::debug!(command = ?kind, privilege = ?chat.privilege, "command denied");
            return vec![Instruction::chat(format!(
                "{} command requires admin/mod.",
                kind.title()
            ))];
        }

        match kind {
            CommandKind::Help => self.help(),
            CommandKind::EmojiList => self.emoji_list(),
            CommandKind::Emoji => self.emoji(chat, invocation.args.first().copied()),
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
