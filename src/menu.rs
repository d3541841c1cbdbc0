//! Command vocabulary and fixed reply texts
//!
//! Menu labels are matched exactly (case-sensitive, emoji included).

use crate::db::RecordCounts;
use crate::system_prompt::CHURCH_NAME;

/// Member keyboard layout, rendered by the transport
pub const MEMBER_KEYBOARD: &[&[&str]] = &[
    &["⛪ Church Info", "📅 Service Times"],
    &["🙏 Prayer Request", "💬 Counseling"],
    &["📖 Ask Bible Question", "📝 Testimony"],
    &["🧾 Register", "📞 Contact"],
];

/// Admin keyboard layout
pub const ADMIN_KEYBOARD: &[&[&str]] = &[
    &["📊 Dashboard", "📢 Broadcast"],
    &["📥 Export Data", "❌ Exit Admin"],
];

pub const PRAYER_ACK: &str = "🙏 Your prayer request has been received. God bless you.";
pub const TESTIMONY_ACK: &str = "📝 Thank you for sharing your testimony. To God be the glory!";
pub const REGISTRATION_OK: &str = "✅ Registration successful. Welcome to the family!";
pub const REGISTRATION_FORMAT_ERROR: &str = "❌ Incorrect format.\nUse: Full Name, Phone Number";
pub const UNAUTHORIZED: &str = "❌ You are not authorized.";
pub const ADMIN_PANEL: &str = "🛠 *Admin Panel*\n\nSelect an option:";
pub const BROADCAST_PROMPT: &str = "📢 Type your broadcast message:";
pub const EXPORT_DONE: &str = "✅ Data export complete.";
pub const GENERIC_FAILURE: &str = "⚠️ Something went wrong. Please try again.";

/// Menu entries that put a member session into an awaiting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberTrigger {
    Prayer,
    Counseling,
    BibleQuestion,
    Testimony,
    Register,
}

impl MemberTrigger {
    pub const ALL: [MemberTrigger; 5] = [
        MemberTrigger::Prayer,
        MemberTrigger::Counseling,
        MemberTrigger::BibleQuestion,
        MemberTrigger::Testimony,
        MemberTrigger::Register,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MemberTrigger::Prayer => "🙏 Prayer Request",
            MemberTrigger::Counseling => "💬 Counseling",
            MemberTrigger::BibleQuestion => "📖 Ask Bible Question",
            MemberTrigger::Testimony => "📝 Testimony",
            MemberTrigger::Register => "🧾 Register",
        }
    }

    /// Prompt sent when the trigger is selected
    pub fn prompt(self) -> &'static str {
        match self {
            MemberTrigger::Prayer => "🙏 Please type your prayer request:",
            MemberTrigger::Counseling => "💬 Please explain your situation for counseling:",
            MemberTrigger::BibleQuestion => {
                "📖 Please type your Bible question or scripture reference:"
            }
            MemberTrigger::Testimony => "📝 Please share your testimony:",
            MemberTrigger::Register => "🧾 Send in this format:\nFull Name, Phone Number",
        }
    }

    pub fn from_label(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == text)
    }
}

/// Admin menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminTrigger {
    Dashboard,
    Broadcast,
    Export,
    Exit,
}

impl AdminTrigger {
    pub const ALL: [AdminTrigger; 4] = [
        AdminTrigger::Dashboard,
        AdminTrigger::Broadcast,
        AdminTrigger::Export,
        AdminTrigger::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AdminTrigger::Dashboard => "📊 Dashboard",
            AdminTrigger::Broadcast => "📢 Broadcast",
            AdminTrigger::Export => "📥 Export Data",
            AdminTrigger::Exit => "❌ Exit Admin",
        }
    }

    pub fn from_label(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == text)
    }
}

pub fn welcome() -> String {
    format!(
        "🙏 *Welcome to {CHURCH_NAME}*\n\n\
         I am your intelligent church assistant.\n\
         How may I help you today?"
    )
}

pub fn dashboard(counts: &RecordCounts) -> String {
    format!(
        "📊 *Church Bot Dashboard*\n\n\
         👥 Members: {}\n\
         🙏 Prayer Requests: {}\n\
         💬 Counseling Requests: {}\n\
         📝 Testimonies: {}",
        counts.members, counts.prayers, counts.counsel, counts.testimonies
    )
}

/// Body delivered to each member during a broadcast
pub fn announcement(text: &str) -> String {
    format!("📢 *Church Announcement*\n\n{text}")
}

pub fn broadcast_summary(delivered: usize) -> String {
    format!("✅ Broadcast sent to {delivered} members.")
}
