//! Session state types

use crate::menu::MemberTrigger;

/// How the next text from a member is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemberMode {
    /// Free text goes to the responder
    #[default]
    Idle,
    AwaitingPrayer,
    AwaitingCounseling,
    /// Stays in place after each answer
    AwaitingBibleQuestion,
    AwaitingTestimony,
    /// Stays in place until a well-formed registration arrives
    AwaitingRegistration,
}

impl MemberMode {
    /// Mode entered when a member selects a menu trigger
    pub fn awaiting(trigger: MemberTrigger) -> Self {
        match trigger {
            MemberTrigger::Prayer => MemberMode::AwaitingPrayer,
            MemberTrigger::Counseling => MemberMode::AwaitingCounseling,
            MemberTrigger::BibleQuestion => MemberMode::AwaitingBibleQuestion,
            MemberTrigger::Testimony => MemberMode::AwaitingTestimony,
            MemberTrigger::Register => MemberMode::AwaitingRegistration,
        }
    }
}

/// Admin sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AdminMode {
    #[default]
    Menu,
    AwaitingBroadcastText,
}

/// Per-user session
///
/// Admin privilege lives in the variant, so a broadcast can never be
/// awaited by an unprivileged session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Session {
    Member(MemberMode),
    Admin(AdminMode),
}

impl Default for Session {
    fn default() -> Self {
        Session::Member(MemberMode::Idle)
    }
}

/// Flat view of the session mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Idle,
    AwaitingPrayer,
    AwaitingCounseling,
    AwaitingBibleQuestion,
    AwaitingTestimony,
    AwaitingRegistration,
    AwaitingBroadcastText,
    AdminMenu,
}

impl Session {
    pub fn admin_menu() -> Self {
        Session::Admin(AdminMode::Menu)
    }

    #[allow(dead_code)] // Used in tests
    pub fn is_admin(&self) -> bool {
        matches!(self, Session::Admin(_))
    }

    pub fn mode(&self) -> Mode {
        match self {
            Session::Member(MemberMode::Idle) => Mode::Idle,
            Session::Member(MemberMode::AwaitingPrayer) => Mode::AwaitingPrayer,
            Session::Member(MemberMode::AwaitingCounseling) => Mode::AwaitingCounseling,
            Session::Member(MemberMode::AwaitingBibleQuestion) => Mode::AwaitingBibleQuestion,
            Session::Member(MemberMode::AwaitingTestimony) => Mode::AwaitingTestimony,
            Session::Member(MemberMode::AwaitingRegistration) => Mode::AwaitingRegistration,
            Session::Admin(AdminMode::Menu) => Mode::AdminMenu,
            Session::Admin(AdminMode::AwaitingBroadcastText) => Mode::AwaitingBroadcastText,
        }
    }
}
