use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use heatbot_common::{Notification, Severity, TelegramConfig};

use crate::error::GatewayError;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub data: Option<String>,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyboardButton {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Inline {
        inline_keyboard: Vec<Vec<InlineButton>>,
    },
    Keyboard {
        keyboard: Vec<Vec<KeyboardButton>>,
        resize_keyboard: bool,
    },
}

impl ReplyMarkup {
    pub fn inline(rows: Vec<Vec<InlineButton>>) -> Self {
        Self::Inline {
            inline_keyboard: rows.into_iter().filter(|row| !row.is_empty()).collect(),
        }
    }

    pub fn keyboard(rows: &[&[&str]]) -> Self {
        Self::Keyboard {
            keyboard: rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|label| KeyboardButton {
                            text: label.to_string(),
                        })
                        .collect()
                })
                .collect(),
            resize_keyboard: true,
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a ReplyMarkup>,
}

#[derive(Debug, Serialize)]
struct EditMessageText<'a> {
    chat_id: &'a str,
    message_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a ReplyMarkup>,
}

#[derive(Debug, Serialize)]
struct AnswerCallbackQuery<'a> {
    callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(http: reqwest::Client, config: &TelegramConfig) -> Option<Self> {
        if config.bot_token.is_empty() {
            return None;
        }
        let api_base = config
            .api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/');
        Some(Self {
            http,
            base_url: format!("{api_base}/bot{}", config.bot_token),
        })
    }

    pub async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        reply_markup: Option<&ReplyMarkup>,
    ) -> Result<(), GatewayError> {
        let body = SendMessage {
            chat_id,
            text,
            reply_markup,
        };
        self.call("sendMessage", &body).await
    }

    pub async fn edit_message_text(
        &self,
        chat_id: &str,
        message_id: i64,
        text: &str,
        reply_markup: Option<&ReplyMarkup>,
    ) -> Result<(), GatewayError> {
        let body = EditMessageText {
            chat_id,
            message_id,
            text,
            reply_markup,
        };
        self.call("editMessageText", &body).await
    }

    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
    ) -> Result<(), GatewayError> {
        let body = AnswerCallbackQuery {
            callback_query_id,
            text,
        };
        self.call("answerCallbackQuery", &body).await
    }

    async fn call<T: Serialize>(&self, method: &'static str, body: &T) -> Result<(), GatewayError> {
        let response: ApiResponse = self
            .http
            .post(format!("{}/{method}", self.base_url))
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        if response.ok {
            Ok(())
        } else {
            Err(GatewayError::Api {
                method,
                description: response
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            })
        }
    }
}

/// Best-effort delivery of controller notifications to the owner's chat.
#[derive(Clone)]
pub struct Notifier {
    client: Option<TelegramClient>,
    chat_id: String,
}

impl Notifier {
    pub fn new(client: Option<TelegramClient>, chat_id: String) -> Self {
        Self { client, chat_id }
    }

    pub async fn notify(&self, text: &str) -> Result<(), GatewayError> {
        let Some(client) = self.client.as_ref().filter(|_| !self.chat_id.is_empty()) else {
            return Err(GatewayError::NotConfigured);
        };
        client.send_message(&self.chat_id, text, None).await
    }

    pub async fn deliver(&self, notifications: Vec<Notification>) {
        for notification in notifications {
            match notification.severity {
                Severity::Critical => error!(kind = ?notification.kind, "{}", notification.text),
                Severity::Warning => warn!(kind = ?notification.kind, "{}", notification.text),
                Severity::Info => info!(kind = ?notification.kind, "{}", notification.text),
            }

            match self.notify(&notification.text).await {
                Ok(()) | Err(GatewayError::NotConfigured) => {}
                Err(err) => warn!("notification delivery failed: {err}"),
            }
        }
    }
}
