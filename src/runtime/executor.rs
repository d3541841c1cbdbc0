//! Session dispatcher
//!
//! Runs the pure transition for an inbound message, then executes the
//! resulting effects in order. The new session is committed only when every
//! effect succeeded.

use super::broadcast::broadcast;
use super::sessions::SessionStore;
use super::traits::{ChatId, Notifier, NotifyError, RecordStore, Responder};

use crate::admin::AdminGate;
use crate::db::{DbError, UserId};
use crate::export;
use crate::menu;
use crate::state_machine::{transition, Command, Effect, Event, Reply, Session};
use std::sync::Arc;
use thiserror::Error;

/// One message from a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub user: UserId,
    pub chat: ChatId,
    pub text: String,
}

impl Inbound {
    /// Message sent in the user's private chat
    #[allow(dead_code)] // Used in tests
    pub fn private(user: UserId, text: impl Into<String>) -> Self {
        Self {
            user,
            chat: ChatId::from(user),
            text: text.into(),
        }
    }
}

/// Failure that aborts the remaining effects of a transition
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] DbError),
    #[error("Export rendering failed: {0}")]
    Export(#[from] serde_json::Error),
    #[error("Export delivery failed: {0}")]
    Delivery(#[from] NotifyError),
}

/// Generic dispatcher that can work with any store, responder and notifier
pub struct Dispatcher<S, R, N>
where
    S: RecordStore,
    R: Responder,
    N: Notifier,
{
    store: S,
    responder: R,
    notifier: N,
    gate: AdminGate,
    sessions: Arc<SessionStore>,
}

impl<S, R, N> Dispatcher<S, R, N>
where
    S: RecordStore,
    R: Responder,
    N: Notifier,
{
    pub fn new(
        store: S,
        responder: R,
        notifier: N,
        gate: AdminGate,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            store,
            responder,
            notifier,
            gate,
            sessions,
        }
    }

    #[allow(dead_code)] // Used in tests
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Handle one inbound message and return the session it left behind.
    ///
    /// Callers must not handle two messages for the same user at once.
    pub async fn handle(&self, inbound: Inbound) -> Session {
        let current = self.sessions.get(inbound.user).await;
        let event = Event::parse(&inbound.text);
        let caller_is_admin = self.gate.is_admin(inbound.user);

        if event == Event::Command(Command::Admin) && !caller_is_admin {
            tracing::warn!(user = %inbound.user, "Unauthorized admin attempt");
        }

        let result = transition(&current, &event, caller_is_admin);

        tracing::debug!(
            user = %inbound.user,
            from = ?current.mode(),
            to = ?result.new_session.mode(),
            effects = result.effects.len(),
            "transition"
        );

        let next = match self.execute_effects(&inbound, result.effects).await {
            Ok(()) => result.new_session,
            Err(e) => {
                tracing::error!(user = %inbound.user, error = %e, "Request failed, keeping session");
                self.deliver(inbound.chat, &Reply::plain(menu::GENERIC_FAILURE))
                    .await;
                current
            }
        };

        self.sessions.put(inbound.user, next).await;
        next
    }

    async fn execute_effects(
        &self,
        inbound: &Inbound,
        effects: Vec<Effect>,
    ) -> Result<(), DispatchError> {
        for effect in effects {
            self.execute_effect(inbound, effect).await?;
        }
        Ok(())
    }

    async fn execute_effect(&self, inbound: &Inbound, effect: Effect) -> Result<(), DispatchError> {
        let Inbound { user, chat, .. } = *inbound;

        match effect {
            Effect::Reply(reply) => {
                self.deliver(chat, &reply).await;
            }

            Effect::Typing => {
                if let Err(e) = self.notifier.send_typing(chat).await {
                    tracing::debug!(chat = %chat, error = %e, "Typing indicator failed");
                }
            }

            Effect::PersistSubmission { category, text } => {
                let id = self.store.insert_submission(category, user, &text).await?;
                tracing::info!(user = %user, category = %category, id, "Submission stored");
            }

            Effect::RegisterMember { name, phone } => {
                let id = self.store.register_member(user, &name, &phone).await?;
                tracing::info!(user = %user, id, "Member registered");
            }

            Effect::Answer { text } => {
                let answer = self.responder.answer(&text).await;
                self.deliver(chat, &Reply::plain(answer)).await;
            }

            Effect::Dashboard => {
                let counts = self.store.count_all().await?;
                self.deliver(chat, &Reply::markdown(menu::dashboard(&counts)))
                    .await;
            }

            Effect::Broadcast { text } => {
                let report = broadcast(&self.store, &self.notifier, &text).await?;
                self.deliver(chat, &Reply::plain(menu::broadcast_summary(report.delivered)))
                    .await;
            }

            Effect::Export => {
                let snapshot = self.store.export_all().await?;
                let artifact = export::render(&snapshot, &chrono::Local::now())?;
                self.notifier.send_document(chat, &artifact).await?;
                tracing::info!(file = %artifact.file_name, bytes = artifact.bytes.len(), "Export sent");
                self.deliver(chat, &Reply::plain(menu::EXPORT_DONE)).await;
            }
        }

        Ok(())
    }

    /// Best-effort reply; a lost reply never changes the outcome
    async fn deliver(&self, chat: ChatId, reply: &Reply) {
        if let Err(e) = self.notifier.send(chat, reply).await {
            tracing::warn!(chat = %chat, error = %e, "Reply delivery failed");
        }
    }
}
