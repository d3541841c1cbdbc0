//! Telegram Bot API transport
//!
//! Long-polls `getUpdates` and feeds text messages to the session router.
//! Outbound replies, typing indicators and export documents go through the
//! same client.

mod types;

use crate::export::ExportArtifact;
use crate::runtime::{ChatId, Notifier, NotifyError, RecordStore, Responder, SessionRouter};
use crate::state_machine::Reply;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use types::{ApiResponse, GetUpdates, SendChatAction, SendMessage, Update};

pub const API_BASE: &str = "https://api.telegram.org";

/// Seconds a `getUpdates` call may wait server-side
pub const POLL_TIMEOUT_SECS: u64 = 30;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
    #[error("Bot API error {code}: {description}")]
    Api {
        code: i64,
        description: String,
        retry_after: Option<u64>,
    },
    #[error("Malformed Bot API response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for TelegramError {
    /// Request URLs carry the bot token and must not reach the logs
    fn from(e: reqwest::Error) -> Self {
        TelegramError::Http(e.without_url())
    }
}

impl From<TelegramError> for NotifyError {
    fn from(e: TelegramError) -> Self {
        match e {
            TelegramError::Api { .. } => NotifyError::Rejected(e.to_string()),
            TelegramError::Http(_) | TelegramError::Decode(_) => {
                NotifyError::Transport(e.to_string())
            }
        }
    }
}

/// Bot API client bound to one bot token
pub struct TelegramClient {
    http: Client,
    bot_url: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Result<Self, TelegramError> {
        Self::with_api_base(API_BASE, token)
    }

    pub fn with_api_base(api_base: &str, token: &str) -> Result<Self, TelegramError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            bot_url: format!("{}/bot{token}", api_base.trim_end_matches('/')),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.bot_url)
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;
        let body = response.text().await?;
        parse_response(&body)
    }

    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let body = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        let response = self
            .http
            .post(self.method_url("getUpdates"))
            // Long poll outlives the default request timeout
            .timeout(Duration::from_secs(timeout_secs) + REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await?;
        let text = response.text().await?;
        parse_response(&text)
    }

    pub async fn send_message(&self, chat: ChatId, reply: &Reply) -> Result<(), TelegramError> {
        let _: IgnoredAny = self
            .call("sendMessage", &SendMessage::new(chat, reply))
            .await?;
        Ok(())
    }

    pub async fn send_chat_action(&self, chat: ChatId) -> Result<(), TelegramError> {
        let body = SendChatAction {
            chat_id: chat.0,
            action: "typing",
        };
        let _: IgnoredAny = self.call("sendChatAction", &body).await?;
        Ok(())
    }

    pub async fn upload_document(
        &self,
        chat: ChatId,
        artifact: &ExportArtifact,
    ) -> Result<(), TelegramError> {
        let document = Part::bytes(artifact.bytes.clone())
            .file_name(artifact.file_name.clone())
            .mime_str("application/json")?;
        let form = Form::new()
            .text("chat_id", chat.to_string())
            .part("document", document);

        let response = self
            .http
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;
        let text = response.text().await?;
        let _: IgnoredAny = parse_response(&text)?;
        Ok(())
    }
}

fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T, TelegramError> {
    let envelope: ApiResponse<T> = serde_json::from_str(body)?;
    match envelope {
        ApiResponse {
            ok: true,
            result: Some(result),
            ..
        } => Ok(result),
        ApiResponse {
            error_code,
            description,
            parameters,
            ..
        } => Err(TelegramError::Api {
            code: error_code.unwrap_or_default(),
            description: description.unwrap_or_else(|| "no description".to_string()),
            retry_after: parameters.and_then(|p| p.retry_after),
        }),
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send(&self, chat: ChatId, reply: &Reply) -> Result<(), NotifyError> {
        Ok(self.send_message(chat, reply).await?)
    }

    async fn send_typing(&self, chat: ChatId) -> Result<(), NotifyError> {
        Ok(self.send_chat_action(chat).await?)
    }

    async fn send_document(
        &self,
        chat: ChatId,
        artifact: &ExportArtifact,
    ) -> Result<(), NotifyError> {
        Ok(self.upload_document(chat, artifact).await?)
    }
}

/// Poll for updates until `cancel` fires, routing every text message.
///
/// The next poll acknowledges every update seen so far, including ones
/// that carried no text.
pub async fn run_polling<S, R, N>(
    client: &TelegramClient,
    router: &SessionRouter<S, R, N>,
    cancel: CancellationToken,
) where
    S: RecordStore + 'static,
    R: Responder + 'static,
    N: Notifier + 'static,
{
    let mut offset: Option<i64> = None;
    let mut backoff = INITIAL_BACKOFF;

    tracing::info!("Polling for updates");

    loop {
        let polled = tokio::select! {
            () = cancel.cancelled() => break,
            polled = client.get_updates(offset, POLL_TIMEOUT_SECS) => polled,
        };

        match polled {
            Ok(updates) => {
                backoff = INITIAL_BACKOFF;
                for update in updates {
                    offset = Some(update.update_id + 1);
                    if let Some(inbound) = update.into_inbound() {
                        tracing::debug!(user = %inbound.user, chat = %inbound.chat, "Inbound message");
                        router.dispatch(inbound).await;
                    }
                }
            }
            Err(e) => {
                let wait = retry_delay(&e, backoff);
                tracing::warn!(error = %e, wait_secs = wait.as_secs(), "getUpdates failed");
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(wait) => {}
                }
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
        }
    }

    tracing::info!("Polling stopped");
}

/// Server-requested delay wins over local backoff
fn retry_delay(error: &TelegramError, backoff: Duration) -> Duration {
    match error {
        TelegramError::Api {
            retry_after: Some(secs),
            ..
        } => Duration::from_secs(*secs),
        _ => backoff,
    }
}
