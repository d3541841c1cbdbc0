//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::transition::parse_registration;
use super::*;
use crate::db::SubmissionCategory;
use crate::menu::{AdminTrigger, MemberTrigger};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_member_mode() -> impl Strategy<Value = MemberMode> {
    prop_oneof![
        Just(MemberMode::Idle),
        Just(MemberMode::AwaitingPrayer),
        Just(MemberMode::AwaitingCounseling),
        Just(MemberMode::AwaitingBibleQuestion),
        Just(MemberMode::AwaitingTestimony),
        Just(MemberMode::AwaitingRegistration),
    ]
}

fn arb_session() -> impl Strategy<Value = Session> {
    prop_oneof![
        arb_member_mode().prop_map(Session::Member),
        Just(Session::Admin(AdminMode::Menu)),
        Just(Session::Admin(AdminMode::AwaitingBroadcastText)),
    ]
}

fn arb_member_trigger() -> impl Strategy<Value = MemberTrigger> {
    prop::sample::select(MemberTrigger::ALL.to_vec())
}

/// Free text that is neither a menu label nor a command
fn arb_free_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,.?!']{1,60}".prop_filter("must not be a label", |s| {
        MemberTrigger::from_label(s).is_none() && AdminTrigger::from_label(s).is_none()
    })
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::Command(Command::Start)),
        Just(Event::Command(Command::Admin)),
        "[a-z]{1,8}".prop_map(|c| Event::Command(Command::Other(c))),
        arb_free_text().prop_map(Event::Text),
        arb_member_trigger().prop_map(|t| Event::Text(t.label().to_string())),
        prop::sample::select(AdminTrigger::ALL.to_vec())
            .prop_map(|t| Event::Text(t.label().to_string())),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// A member selecting a trigger lands in the matching awaiting mode
    /// and receives exactly that mode's prompt
    #[test]
    fn prop_trigger_enters_awaiting_mode(mode in arb_member_mode(), trigger in arb_member_trigger()) {
        let result = transition(&Session::Member(mode), &Event::Text(trigger.label().to_string()), false);
        prop_assert_eq!(result.new_session, Session::Member(MemberMode::awaiting(trigger)));
        prop_assert_eq!(result.effects, vec![Effect::reply(trigger.prompt())]);
    }

    /// Prayer and testimony text persists exactly once under the right
    /// category and returns the session to idle
    #[test]
    fn prop_submission_persists_once(text in arb_free_text(), testimony in any::<bool>()) {
        let (mode, category) = if testimony {
            (MemberMode::AwaitingTestimony, SubmissionCategory::Testimony)
        } else {
            (MemberMode::AwaitingPrayer, SubmissionCategory::Prayer)
        };
        let result = transition(&Session::Member(mode), &Event::Text(text.clone()), false);

        let persisted: Vec<_> = result.effects.iter().filter(|e| e.touches_store()).collect();
        let expected = Effect::PersistSubmission { category, text };
        prop_assert_eq!(persisted, vec![&expected]);
        prop_assert_eq!(result.new_session, Session::default());
    }

    /// Bible question mode survives any non-trigger text
    #[test]
    fn prop_bible_mode_is_idempotent(text in arb_free_text()) {
        let session = Session::Member(MemberMode::AwaitingBibleQuestion);
        let result = transition(&session, &Event::Text(text), false);
        prop_assert_eq!(result.new_session, session);
    }

    /// Registration either persists and returns to idle, or keeps the mode
    /// and persists nothing
    #[test]
    fn prop_registration_outcome(text in "[a-zA-Z0-9 ,]{0,40}") {
        let session = Session::Member(MemberMode::AwaitingRegistration);
        prop_assume!(MemberTrigger::from_label(&text).is_none());
        let result = transition(&session, &Event::Text(text.clone()), false);

        match parse_registration(&text) {
            Some((name, phone)) => {
                prop_assert_eq!(result.new_session, Session::default());
                let expected = Effect::RegisterMember { name, phone };
                prop_assert_eq!(&result.effects[0], &expected);
            }
            None => {
                prop_assert_eq!(result.new_session, session);
                prop_assert!(!result.effects.iter().any(Effect::touches_store));
            }
        }
    }

    /// Parsed registration fields never carry surrounding whitespace
    #[test]
    fn prop_registration_fields_trimmed(name in " {0,3}[A-Za-z]{1,10} {0,3}", phone in " {0,3}[0-9]{1,11} {0,3}") {
        let parsed = parse_registration(&format!("{name},{phone}"));
        prop_assert_eq!(parsed, Some((name.trim().to_string(), phone.trim().to_string())));
    }

    /// Without the gate's approval no event sequence reaches an admin session
    #[test]
    fn prop_unprivileged_never_becomes_admin(events in prop::collection::vec(arb_event(), 1..20)) {
        let mut session = Session::default();
        for event in &events {
            session = transition(&session, event, false).new_session;
            prop_assert!(!session.is_admin());
        }
    }

    /// Store-touching admin effects only come out of admin sessions
    #[test]
    fn prop_admin_effects_need_admin_session(session in arb_session(), event in arb_event(), gate in any::<bool>()) {
        let result = transition(&session, &event, gate);
        let admin_effect = result.effects.iter().any(|e| {
            matches!(e, Effect::Dashboard | Effect::Broadcast { .. } | Effect::Export)
        });
        if admin_effect {
            prop_assert!(session.is_admin());
        }
    }

    /// Slash commands other than /start and /admin change nothing
    #[test]
    fn prop_unknown_commands_are_inert(session in arb_session(), name in "[a-z]{1,8}", gate in any::<bool>()) {
        let result = transition(&session, &Event::Command(Command::Other(name)), gate);
        prop_assert_eq!(result.new_session, session);
        prop_assert!(result.effects.is_empty());
    }

    /// Transitions are deterministic
    #[test]
    fn prop_transition_is_pure(session in arb_session(), event in arb_event(), gate in any::<bool>()) {
        prop_assert_eq!(transition(&session, &event, gate), transition(&session, &event, gate));
    }
}
