use std::fmt;

use crate::codec::{decode, encode};
use crate::opcode::{ADMIN, ADMIN_HTML, ADMIN_LOGIN, CHAT, CONNECT, LOGIN, NOP, RENAME};

/// A decoded instruction: opcode followed by positional arguments.
#[derive(Clone, PartialEq, Eq)]
pub struct Instruction {
    elements: Vec<String>,
}

impl Instruction {
    /// Create an instruction with no arguments.
    pub fn new(opcode: impl Into<String>) -> Self {
        Self {
            elements: vec![opcode.into()],
        }
    }

    /// Append one argument.
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.elements.push(value.into());
        self
    }

    /// Build an instruction from raw elements. Returns `None` when empty.
    pub fn from_elements(elements: Vec<String>) -> Option<Self> {
        if elements.is_empty() {
            None
        } else {
            Some(Self { elements })
        }
    }

    /// Decode one wire instruction.
    ///
    /// Returns `None` for input that yields no elements; callers treat that
    /// as a no-op rather than an error.
    pub fn decode(src: impl AsRef<[u8]>) -> Option<Self> {
        Self::from_elements(decode(src.as_ref()))
    }

    /// Encode into wire text.
    pub fn encode(&self) -> String {
        encode(&self.elements)
    }

    /// The opcode (first element).
    pub fn opcode(&self) -> &str {
        &self.elements[0]
    }

    /// Positional argument `index`, counting from the element after the opcode.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.elements.get(index + 1).map(String::as_str)
    }

    /// All arguments after the opcode.
    pub fn args(&self) -> &[String] {
        &self.elements[1..]
    }

    /// All elements including the opcode.
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// `nop`
    pub fn nop() -> Self {
        Self::new(NOP)
    }

    /// `rename <name>`
    pub fn rename(name: impl Into<String>) -> Self {
        Self::new(RENAME).arg(name)
    }

    /// `connect <node>`
    pub fn connect(node_id: impl Into<String>) -> Self {
        Self::new(CONNECT).arg(node_id)
    }

    /// `login <token>`
    pub fn login(token: impl Into<String>) -> Self {
        Self::new(LOGIN).arg(token)
    }

    /// `admin 2 <password>`
    pub fn admin_login(password: impl Into<String>) -> Self {
        Self::new(ADMIN).arg(ADMIN_LOGIN).arg(password)
    }

    /// `admin 21 <html>`
    pub fn admin_html(html: impl Into<String>) -> Self {
        Self::new(ADMIN).arg(ADMIN_HTML).arg(html)
    }

    /// `chat <message>`
    pub fn chat(message: impl Into<String>) -> Self {
        Self::new(CHAT).arg(message)
    }
}

// Credentials travel inside `login` and `admin` instructions; keep them out of logs.
impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret_from = match (self.opcode(), self.get(0)) {
            (LOGIN, _) => Some(1),
            (ADMIN, Some(ADMIN_LOGIN)) => Some(2),
            _ => None,
        };
        let mut list = f.debug_list();
        for (index, element) in self.elements.iter().enumerate() {
            match secret_from {
                Some(from) if index >= from => {
                    list.entry(&format_args!("<redacted:{} bytes>", element.len()));
                }
                _ => {
                    list.entry(element);
                }
            }
        }
        list.finish()
    }
}
