//! Planner command grammar
//!
//! One command per line, keywords are case-sensitive:
//!
//! ```text
//! SCROLL UP
//! SCROLL DOWN
//! CLICK <id>
//! TYPE <id> "<text>"
//! TYPESUBMIT <id> "<text>"
//! RETURN DOMAIN
//! ```
//!
//! Lines that match none of these are ignored.

use std::fmt;
use tracing::debug;

/// A single parsed instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ScrollUp,
    ScrollDown,
    Click(usize),
    Type { id: usize, text: String },
    TypeSubmit { id: usize, text: String },
    ReturnToDomain,
}

impl Command {
    /// Parse one line, or `None` if it is not a command
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();

        if line.starts_with("SCROLL UP") {
            return Some(Command::ScrollUp);
        }
        if line.starts_with("SCROLL DOWN") {
            return Some(Command::ScrollDown);
        }
        if line.starts_with("RETURN DOMAIN") {
            return Some(Command::ReturnToDomain);
        }
        if let Some(rest) = line.strip_prefix("CLICK") {
            // Replies sometimes trail the id with a comma and commentary
            let id = rest.split(',').next().unwrap_or_default().trim();
            return id.parse().ok().map(Command::Click);
        }
        if let Some(rest) = line.strip_prefix("TYPESUBMIT") {
            return parse_typing(rest).map(|(id, text)| Command::TypeSubmit { id, text });
        }
        if let Some(rest) = line.strip_prefix("TYPE") {
            return parse_typing(rest).map(|(id, text)| Command::Type { id, text });
        }

        None
    }

    /// The element this command acts on, if any
    pub fn target(&self) -> Option<usize> {
        match self {
            Command::Click(id) | Command::Type { id, .. } | Command::TypeSubmit { id, .. } => {
                Some(*id)
            }
            _ => None,
        }
    }
}

/// `<id> "<text>"` -> (id, text between the first and last quote)
fn parse_typing(rest: &str) -> Option<(usize, String)> {
    let rest = rest.trim_start();
    let (id, remainder) = match rest.split_once(char::is_whitespace) {
        Some((id, remainder)) => (id, remainder.trim()),
        None => (rest, ""),
    };
    let id = id.parse().ok()?;

    let text = match (remainder.find('"'), remainder.rfind('"')) {
        (Some(first), Some(last)) if first < last => &remainder[first + 1..last],
        _ => remainder,
    };

    Some((id, text.to_string()))
}

/// Parse every command in a planner reply, in order
pub fn parse_reply(reply: &str) -> Vec<Command> {
    reply
        .lines()
        .filter_map(|line| {
            let command = Command::parse(line);
            if command.is_none() && !line.trim().is_empty() {
                debug!("Ignoring unrecognized line: {}", line.trim());
            }
            command
        })
        .collect()
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::ScrollUp => write!(f, "SCROLL UP"),
            Command::ScrollDown => write!(f, "SCROLL DOWN"),
            Command::Click(id) => write!(f, "CLICK {}", id),
            Command::Type { id, text } => write!(f, "TYPE {} \"{}\"", id, text),
            Command::TypeSubmit { id, text } => write!(f, "TYPESUBMIT {} \"{}\"", id, text),
            Command::ReturnToDomain => write!(f, "RETURN DOMAIN"),
        }
    }
}
