//! Inbound events

/// Slash commands understood by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Admin,
    /// Any other slash command; ignored
    Other(String),
}

/// A single inbound message, already classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Command(Command),
    Text(String),
}

impl Event {
    /// Classify raw message text.
    ///
    /// `/name`, `/name@bot` and `/name args` are commands; command names
    /// compare case-insensitively. Everything else is text, kept verbatim.
    pub fn parse(text: &str) -> Self {
        let Some(rest) = text.strip_prefix('/') else {
            return Event::Text(text.to_string());
        };

        let word = rest.split_whitespace().next().unwrap_or_default();
        let name = word.split('@').next().unwrap_or_default().to_ascii_lowercase();

        match name.as_str() {
            "start" => Event::Command(Command::Start),
            "admin" => Event::Command(Command::Admin),
            _ => Event::Command(Command::Other(name)),
        }
    }
}
