//! Bot API wire types
//!
//! Only the fields the bot reads or writes are modelled; unknown fields are
//! ignored on decode.

use crate::db::UserId;
use crate::menu;
use crate::runtime::{ChatId, Inbound};
use crate::state_machine::{Menu, Reply, TextFormat};
use serde::{Deserialize, Serialize};

/// Envelope around every Bot API result
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseParameters {
    #[serde(default)]
    pub retry_after: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

impl Update {
    /// Text message from a human sender, if this update carries one
    pub fn into_inbound(self) -> Option<Inbound> {
        let message = self.message?;
        let from = message.from.filter(|u| !u.is_bot)?;
        let text = message.text?;
        Some(Inbound {
            user: UserId(from.id),
            chat: ChatId(message.chat.id),
            text,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct GetUpdates<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyKeyboardMarkup>,
}

impl<'a> SendMessage<'a> {
    pub fn new(chat: ChatId, reply: &'a Reply) -> Self {
        Self {
            chat_id: chat.0,
            text: &reply.text,
            parse_mode: match reply.format {
                TextFormat::Plain => None,
                TextFormat::Markdown => Some("Markdown"),
            },
            reply_markup: reply.menu.map(ReplyKeyboardMarkup::for_menu),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SendChatAction {
    pub chat_id: i64,
    pub action: &'static str,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct KeyboardButton {
    pub text: String,
}

impl ReplyKeyboardMarkup {
    pub fn for_menu(menu: Menu) -> Self {
        let layout = match menu {
            Menu::Member => menu::MEMBER_KEYBOARD,
            Menu::Admin => menu::ADMIN_KEYBOARD,
        };
        Self {
            keyboard: layout
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|label| KeyboardButton {
                            text: (*label).to_string(),
                        })
                        .collect()
                })
                .collect(),
            resize_keyboard: true,
        }
    }
}
