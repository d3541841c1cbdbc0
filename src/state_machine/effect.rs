//! Effects produced by state transitions

use crate::db::SubmissionCategory;

/// Text formatting the transport should apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
    #[default]
    Plain,
    Markdown,
}

/// Keyboard to attach to a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    Member,
    Admin,
}

/// Outbound text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub format: TextFormat,
    pub menu: Option<Menu>,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Plain,
            menu: None,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Markdown,
            menu: None,
        }
    }

    pub fn with_menu(mut self, menu: Menu) -> Self {
        self.menu = Some(menu);
        self
    }
}

/// Effects to be executed after a transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a fixed reply to the caller
    Reply(Reply),

    /// Show a composing indicator
    Typing,

    /// Append a submission record
    PersistSubmission {
        category: SubmissionCategory,
        text: String,
    },

    /// Append a member record
    RegisterMember { name: String, phone: String },

    /// Ask the responder and reply with its answer
    Answer { text: String },

    /// Count every category and reply with the dashboard
    Dashboard,

    /// Fan the announcement out to registered members and reply with the count
    Broadcast { text: String },

    /// Send the full data export as a document
    Export,
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply(Reply::plain(text))
    }

    /// Whether this effect writes to or reads from the record store
    #[allow(dead_code)] // Used in tests
    pub fn touches_store(&self) -> bool {
        matches!(
            self,
            Effect::PersistSubmission { .. }
                | Effect::RegisterMember { .. }
                | Effect::Dashboard
                | Effect::Broadcast { .. }
                | Effect::Export
        )
    }
}
