/// Shorthand command implied by a `:name:` message.
const COLON_COMMAND: &str = "emoji";

/// How chat lines are recognised as commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerConfig {
    /// Literal prefix, e.g. `!`.
    pub prefix: String,
    /// Treat messages starting with `:name:` as `emoji name`.
    pub colon_shorthand: bool,
}

impl TriggerConfig {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            colon_shorthand: false,
        }
    }

    pub fn with_colon_shorthand(mut self, enabled: bool) -> Self {
        self.colon_shorthand = enabled;
        self
    }
}

/// A recognised command: lower-cased name plus whitespace-separated arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub name: String,
    pub args: Vec<&'a str>,
}

/// Recognise a command in `message`.
///
/// The colon shorthand wins over the prefix when both apply. Returns `None`
/// for messages that are not commands.
pub fn parse_invocation<'a>(message: &'a str, config: &TriggerConfig) -> Option<Invocation<'a>> {
    if config.colon_shorthand {
        if let Some(name) = colon_name(message) {
            return Some(Invocation {
                name: COLON_COMMAND.to_string(),
                args: vec![name],
            });
        }
    }

    if config.prefix.is_empty() {
        return None;
    }
    let rest = message.strip_prefix(config.prefix.as_str())?;
    let mut words = rest.split_whitespace();
    let name = words.next()?.to_lowercase();
    Some(Invocation {
        name,
        args: words.collect(),
    })
}

/// `:name:` at the very start of the message, name made of `[A-Za-z0-9_]`.
fn colon_name(message: &str) -> Option<&str> {
    let rest = message.strip_prefix(':')?;
    let end = rest.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))?;
    if end == 0 || !rest[end..].starts_with(':') {
        return None;
    }
    Some(&rest[..end])
}
