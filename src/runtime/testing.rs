//! Mock implementations for testing
//!
//! These mocks enable dispatcher testing without a chat transport or
//! generative backend. Store behavior uses a real in-memory database.

use super::traits::{ChatId, Notifier, NotifyError, RecordStore, Responder};
use crate::db::{DbError, ExportSnapshot, RecordCounts, RecordId, SubmissionCategory, UserId};
use crate::export::ExportArtifact;
use crate::state_machine::Reply;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock Notifier
// ============================================================================

/// Everything a notifier was asked to deliver, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Message(ChatId, Reply),
    Typing(ChatId),
    Document(ChatId, ExportArtifact),
}

/// Records outbound traffic; selected chats reject every delivery
#[derive(Default)]
pub struct MockNotifier {
    log: Mutex<Vec<Outbound>>,
    failing: HashSet<ChatId>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, chats: impl IntoIterator<Item = ChatId>) -> Self {
        self.failing.extend(chats);
        self
    }

    fn record(&self, chat: ChatId, outbound: Outbound) -> Result<(), NotifyError> {
        if self.failing.contains(&chat) {
            return Err(NotifyError::Rejected(format!("chat {chat} blocked the bot")));
        }
        self.log.lock().unwrap().push(outbound);
        Ok(())
    }

    pub fn log(&self) -> Vec<Outbound> {
        self.log.lock().unwrap().clone()
    }

    /// Successfully delivered text messages
    pub fn sent(&self) -> Vec<(ChatId, Reply)> {
        self.log()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Message(chat, reply) => Some((chat, reply)),
                _ => None,
            })
            .collect()
    }

    /// Texts delivered to one chat
    pub fn texts_to(&self, chat: ChatId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(c, _)| *c == chat)
            .map(|(_, r)| r.text)
            .collect()
    }

    pub fn documents(&self) -> Vec<(ChatId, ExportArtifact)> {
        self.log()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Document(chat, artifact) => Some((chat, artifact)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, chat: ChatId, reply: &Reply) -> Result<(), NotifyError> {
        self.record(chat, Outbound::Message(chat, reply.clone()))
    }

    async fn send_typing(&self, chat: ChatId) -> Result<(), NotifyError> {
        self.record(chat, Outbound::Typing(chat))
    }

    async fn send_document(
        &self,
        chat: ChatId,
        artifact: &ExportArtifact,
    ) -> Result<(), NotifyError> {
        self.record(chat, Outbound::Document(chat, artifact.clone()))
    }
}

// ============================================================================
// Mock Responder
// ============================================================================

/// Answers `answer: <question>` and records every question
#[derive(Default)]
pub struct MockResponder {
    questions: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl MockResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Responder that takes `delay` before answering
    pub fn delayed(delay: Duration) -> Self {
        Self {
            questions: Mutex::new(Vec::new()),
            delay: Some(delay),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Responder for MockResponder {
    async fn answer(&self, text: &str) -> String {
        self.questions.lock().unwrap().push(text.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        format!("answer: {text}")
    }
}

// ============================================================================
// Failing Store
// ============================================================================

/// Record store whose every call fails
pub struct FailingStore;

fn unavailable() -> DbError {
    DbError::Worker("store unavailable".to_string())
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn insert_submission(
        &self,
        _category: SubmissionCategory,
        _user: UserId,
        _text: &str,
    ) -> Result<RecordId, DbError> {
        Err(unavailable())
    }

    async fn register_member(
        &self,
        _user: UserId,
        _name: &str,
        _phone: &str,
    ) -> Result<RecordId, DbError> {
        Err(unavailable())
    }

    async fn count_all(&self) -> Result<RecordCounts, DbError> {
        Err(unavailable())
    }

    async fn distinct_member_identities(&self) -> Result<Vec<UserId>, DbError> {
        Err(unavailable())
    }

    async fn export_all(&self) -> Result<ExportSnapshot, DbError> {
        Err(unavailable())
    }
}
