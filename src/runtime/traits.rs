//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the dispatcher with mock implementations.

use crate::db::{
    Database, DbError, ExportSnapshot, RecordCounts, RecordId, SubmissionCategory, UserId,
};
use crate::export::ExportArtifact;
use crate::state_machine::Reply;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Conversation a reply is delivered to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl From<UserId> for ChatId {
    /// Private chats share the user's id
    fn from(user: UserId) -> Self {
        ChatId(user.0)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Delivery failure reported by a transport
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Rejected by chat API: {0}")]
    Rejected(String),
}

/// Append-only record persistence
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_submission(
        &self,
        category: SubmissionCategory,
        user: UserId,
        text: &str,
    ) -> Result<RecordId, DbError>;

    async fn register_member(
        &self,
        user: UserId,
        name: &str,
        phone: &str,
    ) -> Result<RecordId, DbError>;

    async fn count_all(&self) -> Result<RecordCounts, DbError>;

    async fn distinct_member_identities(&self) -> Result<Vec<UserId>, DbError>;

    async fn export_all(&self) -> Result<ExportSnapshot, DbError>;
}

/// Outbound messages to a chat
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat: ChatId, reply: &Reply) -> Result<(), NotifyError>;

    /// Composing indicator shown before slow replies
    async fn send_typing(&self, chat: ChatId) -> Result<(), NotifyError>;

    async fn send_document(&self, chat: ChatId, artifact: &ExportArtifact)
        -> Result<(), NotifyError>;
}

/// Generative answering capability. Never fails from the caller's view.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn answer(&self, text: &str) -> String;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    async fn insert_submission(
        &self,
        category: SubmissionCategory,
        user: UserId,
        text: &str,
    ) -> Result<RecordId, DbError> {
        (**self).insert_submission(category, user, text).await
    }

    async fn register_member(
        &self,
        user: UserId,
        name: &str,
        phone: &str,
    ) -> Result<RecordId, DbError> {
        (**self).register_member(user, name, phone).await
    }

    async fn count_all(&self) -> Result<RecordCounts, DbError> {
        (**self).count_all().await
    }

    async fn distinct_member_identities(&self) -> Result<Vec<UserId>, DbError> {
        (**self).distinct_member_identities().await
    }

    async fn export_all(&self) -> Result<ExportSnapshot, DbError> {
        (**self).export_all().await
    }
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    async fn send(&self, chat: ChatId, reply: &Reply) -> Result<(), NotifyError> {
        (**self).send(chat, reply).await
    }

    async fn send_typing(&self, chat: ChatId) -> Result<(), NotifyError> {
        (**self).send_typing(chat).await
    }

    async fn send_document(
        &self,
        chat: ChatId,
        artifact: &ExportArtifact,
    ) -> Result<(), NotifyError> {
        (**self).send_document(chat, artifact).await
    }
}

#[async_trait]
impl<T: Responder + ?Sized> Responder for Arc<T> {
    async fn answer(&self, text: &str) -> String {
        (**self).answer(text).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use Database as `RecordStore`
///
/// rusqlite calls block, so each one runs on the blocking pool. The
/// connection mutex keeps writes single-file.
#[derive(Clone)]
pub struct DatabaseStore {
    db: Database,
}

impl DatabaseStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn run<T, F>(&self, op: F) -> Result<T, DbError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, DbError> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || op(&db))
            .await
            .map_err(|e| DbError::Worker(e.to_string()))?
    }
}

#[async_trait]
impl RecordStore for DatabaseStore {
    async fn insert_submission(
        &self,
        category: SubmissionCategory,
        user: UserId,
        text: &str,
    ) -> Result<RecordId, DbError> {
        let text = text.to_string();
        self.run(move |db| db.insert_submission(category, user, &text))
            .await
    }

    async fn register_member(
        &self,
        user: UserId,
        name: &str,
        phone: &str,
    ) -> Result<RecordId, DbError> {
        let (name, phone) = (name.to_string(), phone.to_string());
        self.run(move |db| db.register_member(user, &name, &phone))
            .await
    }

    async fn count_all(&self) -> Result<RecordCounts, DbError> {
        self.run(Database::count_all).await
    }

    async fn distinct_member_identities(&self) -> Result<Vec<UserId>, DbError> {
        self.run(Database::distinct_member_identities).await
    }

    async fn export_all(&self) -> Result<ExportSnapshot, DbError> {
        self.run(Database::export_all).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_store_round_trip() {
        let store = DatabaseStore::new(Database::open_in_memory().unwrap());

        store
            .insert_submission(SubmissionCategory::Counseling, UserId(2), "help")
            .await
            .unwrap();
        store
            .register_member(UserId(2), "Jane Doe", "0801")
            .await
            .unwrap();

        let counts = store.count_all().await.unwrap();
        assert_eq!(counts.counsel, 1);
        assert_eq!(counts.members, 1);
        assert_eq!(
            store.distinct_member_identities().await.unwrap(),
            vec![UserId(2)]
        );
        assert_eq!(store.export_all().await.unwrap().counsel[0].text, "help");
    }

    #[tokio::test]
    async fn test_concurrent_writes_are_all_kept() {
        let store = Arc::new(DatabaseStore::new(Database::open_in_memory().unwrap()));

        let writes = (0..20).map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .insert_submission(SubmissionCategory::Prayer, UserId(i), "p")
                    .await
            })
        });
        for handle in futures::future::join_all(writes).await {
            handle.unwrap().unwrap();
        }

        assert_eq!(store.count_all().await.unwrap().prayers, 20);
    }

    #[test]
    fn test_chat_id_from_user() {
        assert_eq!(ChatId::from(UserId(42)), ChatId(42));
    }
}
