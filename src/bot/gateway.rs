//! Outbound side of the chat transport.
//!
//! The conversation engine and the notifier only talk to [`ChatGateway`];
//! [`TelegramGateway`] is the production implementation.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode};

use crate::errors::GatewayError;

/// An inline button carrying an opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

impl Button {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// Rows of inline buttons.
pub type Keyboard = Vec<Vec<Button>>;

/// How the message text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Html,
}

/// A message to send, or the new content of an edited message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub format: TextFormat,
    pub keyboard: Option<Keyboard>,
}

impl OutgoingMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Plain,
            keyboard: None,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Html,
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// Chat transport primitives used by the bot.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn send_message(&self, chat_id: i64, message: OutgoingMessage) -> Result<(), GatewayError>;

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i32,
        message: OutgoingMessage,
    ) -> Result<(), GatewayError>;

    async fn send_typing(&self, chat_id: i64) -> Result<(), GatewayError>;

    async fn answer_callback(&self, callback_id: &str) -> Result<(), GatewayError>;
}

/// [`ChatGateway`] over the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn to_markup(keyboard: Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.into_iter().map(|row| {
        row.into_iter()
            .map(|button| InlineKeyboardButton::callback(button.label, button.payload))
            .collect::<Vec<_>>()
    }))
}

#[async_trait]
impl ChatGateway for TelegramGateway {
    async fn send_message(&self, chat_id: i64, message: OutgoingMessage) -> Result<(), GatewayError> {
        let mut request = self.bot.send_message(ChatId(chat_id), message.text);
        if message.format == TextFormat::Html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(keyboard) = message.keyboard {
            request = request.reply_markup(to_markup(keyboard));
        }
        request.await?;
        Ok(())
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i32,
        message: OutgoingMessage,
    ) -> Result<(), GatewayError> {
        let mut request = self
            .bot
            .edit_message_text(ChatId(chat_id), MessageId(message_id), message.text);
        if message.format == TextFormat::Html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(keyboard) = message.keyboard {
            request = request.reply_markup(to_markup(keyboard));
        }
        request.await?;
        Ok(())
    }

    async fn send_typing(&self, chat_id: i64) -> Result<(), GatewayError> {
        self.bot
            .send_chat_action(ChatId(chat_id), ChatAction::Typing)
            .await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), GatewayError> {
        self.bot.answer_callback_query(callback_id.to_string()).await?;
        Ok(())
    }
}
