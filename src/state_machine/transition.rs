//! Pure state transition function
//!
//! Given the same session, event and admin check, always produces the same
//! next session and effects. No I/O happens here.

use super::{AdminMode, Command, Effect, Event, Menu, MemberMode, Reply, Session};
use crate::db::SubmissionCategory;
use crate::menu::{self, AdminTrigger, MemberTrigger};

/// Result of a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_session: Session,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(session: Session) -> Self {
        Self {
            new_session: session,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Pure transition function
///
/// `caller_is_admin` is the admin gate's verdict for the sender; it is only
/// consulted by the `/admin` command.
pub fn transition(session: &Session, event: &Event, caller_is_admin: bool) -> TransitionResult {
    match event {
        // /start greets without touching the session
        Event::Command(Command::Start) => TransitionResult::new(*session).with_effect(
            Effect::Reply(Reply::markdown(menu::welcome()).with_menu(Menu::Member)),
        ),

        Event::Command(Command::Admin) if caller_is_admin => {
            TransitionResult::new(Session::admin_menu()).with_effect(Effect::Reply(
                Reply::markdown(menu::ADMIN_PANEL).with_menu(Menu::Admin),
            ))
        }

        Event::Command(Command::Admin) => {
            TransitionResult::new(*session).with_effect(Effect::reply(menu::UNAUTHORIZED))
        }

        Event::Command(Command::Other(_)) => TransitionResult::new(*session),

        Event::Text(text) => match session {
            Session::Admin(mode) => admin_text(*mode, text),
            Session::Member(mode) => member_text(*mode, text),
        },
    }
}

fn admin_text(mode: AdminMode, text: &str) -> TransitionResult {
    let current = Session::Admin(mode);

    // Menu labels short-circuit whatever the admin was doing
    if let Some(trigger) = AdminTrigger::from_label(text) {
        return match trigger {
            AdminTrigger::Dashboard => TransitionResult::new(current).with_effect(Effect::Dashboard),
            AdminTrigger::Broadcast => {
                TransitionResult::new(Session::Admin(AdminMode::AwaitingBroadcastText))
                    .with_effect(Effect::reply(menu::BROADCAST_PROMPT))
            }
            AdminTrigger::Export => TransitionResult::new(current).with_effect(Effect::Export),
            AdminTrigger::Exit => TransitionResult::new(Session::default()).with_effect(
                Effect::Reply(Reply::markdown(menu::welcome()).with_menu(Menu::Member)),
            ),
        };
    }

    match mode {
        AdminMode::AwaitingBroadcastText => TransitionResult::new(Session::admin_menu())
            .with_effect(Effect::Broadcast {
                text: text.to_string(),
            }),
        // Member triggers and free text do nothing until the admin exits
        AdminMode::Menu => TransitionResult::new(current),
    }
}

fn member_text(mode: MemberMode, text: &str) -> TransitionResult {
    // A trigger re-targets the session from any member mode
    if let Some(trigger) = MemberTrigger::from_label(text) {
        return TransitionResult::new(Session::Member(MemberMode::awaiting(trigger)))
            .with_effect(Effect::reply(trigger.prompt()));
    }

    let idle = Session::default();
    match mode {
        MemberMode::Idle => TransitionResult::new(idle)
            .with_effect(Effect::Typing)
            .with_effect(Effect::Answer {
                text: text.to_string(),
            }),

        MemberMode::AwaitingPrayer => TransitionResult::new(idle)
            .with_effect(Effect::PersistSubmission {
                category: SubmissionCategory::Prayer,
                text: text.to_string(),
            })
            .with_effect(Effect::reply(menu::PRAYER_ACK)),

        MemberMode::AwaitingCounseling => TransitionResult::new(idle)
            .with_effect(Effect::PersistSubmission {
                category: SubmissionCategory::Counseling,
                text: text.to_string(),
            })
            .with_effect(Effect::Typing)
            .with_effect(Effect::Answer {
                text: text.to_string(),
            }),

        // Sticky: the member keeps asking until they pick something else
        MemberMode::AwaitingBibleQuestion => {
            TransitionResult::new(Session::Member(MemberMode::AwaitingBibleQuestion))
                .with_effect(Effect::Typing)
                .with_effect(Effect::Answer {
                    text: text.to_string(),
                })
        }

        MemberMode::AwaitingTestimony => TransitionResult::new(idle)
            .with_effect(Effect::PersistSubmission {
                category: SubmissionCategory::Testimony,
                text: text.to_string(),
            })
            .with_effect(Effect::reply(menu::TESTIMONY_ACK)),

        MemberMode::AwaitingRegistration => match parse_registration(text) {
            Some((name, phone)) => TransitionResult::new(idle)
                .with_effect(Effect::RegisterMember { name, phone })
                .with_effect(Effect::reply(menu::REGISTRATION_OK)),
            None => TransitionResult::new(Session::Member(MemberMode::AwaitingRegistration))
                .with_effect(Effect::reply(menu::REGISTRATION_FORMAT_ERROR)),
        },
    }
}

/// Split `Full Name, Phone Number` on the first comma.
///
/// Both fields are trimmed and must be non-empty.
pub fn parse_registration(text: &str) -> Option<(String, String)> {
    let (name, phone) = text.split_once(',')?;
    let (name, phone) = (name.trim(), phone.trim());
    if name.is_empty() || phone.is_empty() {
        return None;
    }
    Some((name.to_string(), phone.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Event {
        Event::Text(s.to_string())
    }

    fn idle() -> Session {
        Session::default()
    }

    #[test]
    fn test_idle_text_goes_to_responder() {
        let result = transition(&idle(), &text("What is grace?"), false);
        assert_eq!(result.new_session, idle());
        assert_eq!(
            result.effects,
            vec![
                Effect::Typing,
                Effect::Answer {
                    text: "What is grace?".to_string()
                }
            ]
        );
    }

    #[test]
    fn test_info_buttons_are_answered_in_idle() {
        let result = transition(&idle(), &text("⛪ Church Info"), false);
        assert_eq!(result.new_session, idle());
        assert!(matches!(result.effects[1], Effect::Answer { .. }));
    }

    #[test]
    fn test_prayer_flow() {
        let prompted = transition(&idle(), &text("🙏 Prayer Request"), false);
        assert_eq!(
            prompted.new_session,
            Session::Member(MemberMode::AwaitingPrayer)
        );
        assert_eq!(
            prompted.effects,
            vec![Effect::reply("🙏 Please type your prayer request:")]
        );

        let done = transition(&prompted.new_session, &text("pray for my exams"), false);
        assert_eq!(done.new_session, idle());
        assert_eq!(
            done.effects,
            vec![
                Effect::PersistSubmission {
                    category: SubmissionCategory::Prayer,
                    text: "pray for my exams".to_string()
                },
                Effect::reply(menu::PRAYER_ACK),
            ]
        );
    }

    #[test]
    fn test_counseling_persists_then_answers() {
        let session = Session::Member(MemberMode::AwaitingCounseling);
        let result = transition(&session, &text("I feel lost"), false);
        assert_eq!(result.new_session, idle());
        assert!(matches!(
            result.effects.as_slice(),
            [
                Effect::PersistSubmission {
                    category: SubmissionCategory::Counseling,
                    ..
                },
                Effect::Typing,
                Effect::Answer { .. }
            ]
        ));
    }

    #[test]
    fn test_bible_question_mode_is_sticky() {
        let session = Session::Member(MemberMode::AwaitingBibleQuestion);
        let first = transition(&session, &text("Who wrote Hebrews?"), false);
        let second = transition(&first.new_session, &text("And Romans?"), false);
        assert_eq!(first.new_session, session);
        assert_eq!(second.new_session, session);
    }

    #[test]
    fn test_trigger_retargets_from_awaiting_mode() {
        let session = Session::Member(MemberMode::AwaitingPrayer);
        let result = transition(&session, &text("📝 Testimony"), false);
        assert_eq!(
            result.new_session,
            Session::Member(MemberMode::AwaitingTestimony)
        );
        assert!(!result.effects.iter().any(Effect::touches_store));
    }

    #[test]
    fn test_registration_success() {
        let session = Session::Member(MemberMode::AwaitingRegistration);
        let result = transition(&session, &text("Jane Doe, 08012345678"), false);
        assert_eq!(result.new_session, idle());
        assert_eq!(
            result.effects[0],
            Effect::RegisterMember {
                name: "Jane Doe".to_string(),
                phone: "08012345678".to_string()
            }
        );
        assert_eq!(result.effects[1], Effect::reply(menu::REGISTRATION_OK));
    }

    #[test]
    fn test_registration_format_error_keeps_mode() {
        let session = Session::Member(MemberMode::AwaitingRegistration);
        let result = transition(&session, &text("no comma here"), false);
        assert_eq!(result.new_session, session);
        assert_eq!(
            result.effects,
            vec![Effect::reply(menu::REGISTRATION_FORMAT_ERROR)]
        );
    }

    #[test]
    fn test_parse_registration() {
        assert_eq!(
            parse_registration(" Jane Doe ,  0801 "),
            Some(("Jane Doe".to_string(), "0801".to_string()))
        );
        assert_eq!(
            parse_registration("Jane, 0801, extra"),
            Some(("Jane".to_string(), "0801, extra".to_string()))
        );
        assert_eq!(parse_registration("no comma here"), None);
        assert_eq!(parse_registration(", 0801"), None);
        assert_eq!(parse_registration("Jane,   "), None);
    }

    #[test]
    fn test_start_keeps_session() {
        let session = Session::Member(MemberMode::AwaitingTestimony);
        let result = transition(&session, &Event::Command(Command::Start), false);
        assert_eq!(result.new_session, session);
        assert!(matches!(
            &result.effects[0],
            Effect::Reply(Reply { menu: Some(Menu::Member), .. })
        ));
    }

    #[test]
    fn test_admin_entry_requires_gate() {
        let session = Session::Member(MemberMode::AwaitingPrayer);

        let denied = transition(&session, &Event::Command(Command::Admin), false);
        assert_eq!(denied.new_session, session);
        assert_eq!(denied.effects, vec![Effect::reply(menu::UNAUTHORIZED)]);

        let granted = transition(&session, &Event::Command(Command::Admin), true);
        assert_eq!(granted.new_session, Session::admin_menu());
        assert!(matches!(
            &granted.effects[0],
            Effect::Reply(Reply { menu: Some(Menu::Admin), .. })
        ));
    }

    #[test]
    fn test_unknown_command_is_ignored() {
        let session = Session::Member(MemberMode::AwaitingPrayer);
        let result = transition(&session, &Event::Command(Command::Other("x".into())), true);
        assert_eq!(result, TransitionResult::new(session));
    }

    #[test]
    fn test_admin_menu_triggers() {
        let admin = Session::admin_menu();

        let dashboard = transition(&admin, &text("📊 Dashboard"), true);
        assert_eq!(dashboard.new_session, admin);
        assert_eq!(dashboard.effects, vec![Effect::Dashboard]);

        let export = transition(&admin, &text("📥 Export Data"), true);
        assert_eq!(export.effects, vec![Effect::Export]);

        let prompt = transition(&admin, &text("📢 Broadcast"), true);
        assert_eq!(
            prompt.new_session,
            Session::Admin(AdminMode::AwaitingBroadcastText)
        );

        let exit = transition(&admin, &text("❌ Exit Admin"), true);
        assert_eq!(exit.new_session, idle());
    }

    #[test]
    fn test_broadcast_text_returns_to_admin_menu() {
        let session = Session::Admin(AdminMode::AwaitingBroadcastText);
        let result = transition(&session, &text("Service starts at 9"), true);
        assert_eq!(result.new_session, Session::admin_menu());
        assert_eq!(
            result.effects,
            vec![Effect::Broadcast {
                text: "Service starts at 9".to_string()
            }]
        );
    }

    #[test]
    fn test_admin_label_while_awaiting_broadcast_is_not_broadcast() {
        // Labels run their own action rather than being sent as the broadcast
        let session = Session::Admin(AdminMode::AwaitingBroadcastText);
        for trigger in AdminTrigger::ALL {
            let result = transition(&session, &text(trigger.label()), true);
            assert!(!result
                .effects
                .iter()
                .any(|e| matches!(e, Effect::Broadcast { .. })));
        }
    }

    #[test]
    fn test_admin_menu_ignores_member_triggers_and_free_text() {
        // Member buttons stay inert in the admin panel; the admin must exit first
        let admin = Session::admin_menu();
        let mut inputs: Vec<&str> = MemberTrigger::ALL.iter().map(|t| t.label()).collect();
        inputs.extend(["hello", "Jane, 0801"]);
        for input in inputs {
            let result = transition(&admin, &text(input), true);
            assert_eq!(result, TransitionResult::new(admin));
        }
    }
}
