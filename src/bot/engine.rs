//! # Conversation Engine
//!
//! Per-user state machine behind the bot:
//!
//! - `/start` puts the user in [`ConversationState::Searching`]
//! - free text while searching lists up to [`MAX_CANDIDATES`] restaurants and
//!   moves to [`ConversationState::AwaitingSelection`]
//! - picking one checks it: open ends the conversation with a link, closed
//!   offers a one-time reopening notification
//! - `REGISTER`/`REMOVE`/`NO` buttons are honoured in any state
//!
//! Directory and store failures stop at the interaction boundary: they are
//! logged and the user gets a plain retry message. Only gateway errors are
//! returned to the caller.

use std::sync::Arc;
use teloxide::utils::command::BotCommands;
use tracing::warn;

use crate::bot::callback_data::{CallbackAction, DECLINE};
use crate::bot::commands::Command;
use crate::bot::gateway::{Button, ChatGateway, OutgoingMessage};
use crate::bot::messages;
use crate::bot::session::{ConversationState, SessionStore};
use crate::database::connection::DatabaseManager;
use crate::database::models::{Registration, RemovalReason};
use crate::directory::{DirectoryClient, LanguagePreference};
use crate::errors::GatewayError;
use crate::utils::logging::{
    log_event_error, log_event_start, log_store_error, log_store_operation, log_validation_error,
};
use crate::utils::validation::validate_search_query;

/// Search results shown as buttons.
pub const MAX_CANDIDATES: usize = 10;

/// A button press, as delivered by the chat transport.
#[derive(Debug, Clone)]
pub struct CallbackEvent {
    pub callback_id: String,
    pub user_id: i64,
    pub chat_id: i64,
    /// Message carrying the pressed button, when still accessible
    pub message_id: Option<i32>,
    pub data: String,
}

pub struct ConversationEngine {
    gateway: Arc<dyn ChatGateway>,
    directory: Arc<dyn DirectoryClient>,
    db: DatabaseManager,
    sessions: Arc<SessionStore>,
    languages: LanguagePreference,
}

impl ConversationEngine {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        directory: Arc<dyn DirectoryClient>,
        db: DatabaseManager,
        sessions: Arc<SessionStore>,
        languages: LanguagePreference,
    ) -> Self {
        Self {
            gateway,
            directory,
            db,
            sessions,
            languages,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub async fn handle_command(
        &self,
        user_id: i64,
        chat_id: i64,
        command: Command,
    ) -> Result<(), GatewayError> {
        log_event_start(&format!("/{command:?}").to_lowercase(), user_id, chat_id, None);

        match command {
            Command::Start => {
                self.sessions.set(user_id, ConversationState::Searching);
                self.send(chat_id, OutgoingMessage::plain(messages::WELCOME)).await
            }
            Command::Cancel => {
                self.sessions.clear(user_id);
                self.send(chat_id, OutgoingMessage::plain(messages::GOODBYE)).await
            }
            Command::Show => self.show_registrations(user_id, chat_id).await,
            Command::Help => {
                self.send(
                    chat_id,
                    OutgoingMessage::plain(Command::descriptions().to_string()),
                )
                .await
            }
        }
    }

    /// Free text. Only acted upon while the user is searching.
    pub async fn handle_text(&self, user_id: i64, chat_id: i64, text: &str) -> Result<(), GatewayError> {
        if text.starts_with('/') || text.trim().is_empty() {
            return Ok(());
        }
        if self.sessions.get(user_id) != Some(ConversationState::Searching) {
            return Ok(());
        }

        let query = match validate_search_query(text) {
            Ok(query) => query,
            Err(e) => {
                log_validation_error("search", &e.to_string(), user_id, chat_id);
                return self
                    .send(chat_id, OutgoingMessage::plain(messages::invalid_search(&e.to_string())))
                    .await;
            }
        };

        log_event_start("search", user_id, chat_id, Some(query));

        if let Err(e) = self.gateway.send_typing(chat_id).await {
            warn!("Failed to send typing indicator to chat {}: {}", chat_id, e);
        }

        let venues = match self.directory.search(query).await {
            Ok(venues) => venues,
            Err(e) => {
                log_event_error("search", user_id, chat_id, &e.to_string());
                return self
                    .send(chat_id, OutgoingMessage::plain(messages::SEARCH_FAILED))
                    .await;
            }
        };

        let keyboard: Vec<Vec<Button>> = venues
            .iter()
            .filter_map(|venue| {
                let select = CallbackAction::Select {
                    slug: venue.slug.clone(),
                };
                let Some(payload) = select.encode() else {
                    warn!("Skipping venue '{}': slug does not fit a button", venue.slug);
                    return None;
                };
                Some(vec![Button::new(self.languages.resolve(&venue.names), payload)])
            })
            .take(MAX_CANDIDATES)
            .collect();

        if keyboard.is_empty() {
            return self
                .send(chat_id, OutgoingMessage::plain(messages::NO_RESULTS))
                .await;
        }

        self.send(
            chat_id,
            OutgoingMessage::plain(messages::SELECT_RESTAURANT).with_keyboard(keyboard),
        )
        .await?;
        self.sessions.set(user_id, ConversationState::AwaitingSelection);
        Ok(())
    }

    pub async fn handle_callback(&self, event: CallbackEvent) -> Result<(), GatewayError> {
        if let Err(e) = self.gateway.answer_callback(&event.callback_id).await {
            warn!("Failed to answer callback {}: {}", event.callback_id, e);
        }

        let Some(action) = CallbackAction::parse(&event.data) else {
            warn!(
                "Ignoring unrecognised callback data '{}' from user {}",
                event.data, event.user_id
            );
            return Ok(());
        };

        log_event_start("callback", event.user_id, event.chat_id, Some(&event.data));

        match action {
            CallbackAction::Register { slug, name } => self.register(&event, &slug, &name).await,
            CallbackAction::Remove { slug } => self.remove(&event, &slug).await,
            CallbackAction::Decline => {
                self.sessions.clear(event.user_id);
                self.reply(&event, OutgoingMessage::plain(messages::GOODBYE)).await
            }
            CallbackAction::Select { slug } => {
                if self.sessions.get(event.user_id) != Some(ConversationState::AwaitingSelection) {
                    return Ok(());
                }
                self.check_restaurant(&event, &slug).await
            }
        }
    }

    async fn check_restaurant(&self, event: &CallbackEvent, slug: &str) -> Result<(), GatewayError> {
        let status = match self.directory.get_status(slug).await {
            Ok(status) => status,
            Err(e) => {
                log_event_error("check", event.user_id, event.chat_id, &e.to_string());
                return self
                    .send(event.chat_id, OutgoingMessage::plain(messages::CHECK_FAILED))
                    .await;
            }
        };

        let name = self.languages.resolve(&status.names);

        if status.online {
            self.reply(
                event,
                OutgoingMessage::html(messages::restaurant_open(&name, &status.public_url)),
            )
            .await?;
            self.sessions.clear(event.user_id);
            return Ok(());
        }

        let register = CallbackAction::Register {
            slug: slug.to_string(),
            name: name.clone(),
        };
        let Some(register) = register.encode() else {
            log_event_error(
                "check",
                event.user_id,
                event.chat_id,
                &format!("no button payload fits slug {slug}"),
            );
            self.sessions.set(event.user_id, ConversationState::Searching);
            return self
                .send(event.chat_id, OutgoingMessage::plain(messages::REGISTER_FAILED))
                .await;
        };

        let keyboard = vec![
            vec![Button::new(messages::YES, register)],
            vec![Button::new(messages::NO, DECLINE)],
        ];

        self.reply(
            event,
            OutgoingMessage::plain(messages::restaurant_closed(&name)).with_keyboard(keyboard),
        )
        .await?;
        self.sessions.set(event.user_id, ConversationState::Searching);
        Ok(())
    }

    async fn register(&self, event: &CallbackEvent, slug: &str, name: &str) -> Result<(), GatewayError> {
        let name = if name.is_empty() { slug } else { name };

        match Registration::add(&self.db.pool, event.user_id, slug).await {
            Ok(Some(id)) => {
                log_store_operation("INSERT", Some(&format!("{id} user {} slug {slug}", event.user_id)));
                self.sessions.clear(event.user_id);
                self.reply(event, OutgoingMessage::plain(messages::registered(name)))
                    .await
            }
            Ok(None) => {
                self.sessions.clear(event.user_id);
                self.reply(event, OutgoingMessage::plain(messages::already_registered(name)))
                    .await
            }
            Err(e) => {
                log_store_error(
                    "INSERT",
                    &e.to_string(),
                    Some(&format!("user {} slug {slug}", event.user_id)),
                );
                self.send(event.chat_id, OutgoingMessage::plain(messages::REGISTER_FAILED))
                    .await
            }
        }
    }

    async fn remove(&self, event: &CallbackEvent, slug: &str) -> Result<(), GatewayError> {
        match Registration::remove(&self.db.pool, event.user_id, slug, RemovalReason::UserManually).await {
            Ok(0) => {
                self.reply(event, OutgoingMessage::plain(messages::NOT_FOUND_FOR_REMOVAL))
                    .await
            }
            Ok(_) => {
                log_store_operation("UPDATE", Some(&format!("user {} slug {slug} removed", event.user_id)));
                self.reply(event, OutgoingMessage::plain(messages::REMOVED)).await
            }
            Err(e) => {
                log_store_error(
                    "UPDATE",
                    &e.to_string(),
                    Some(&format!("user {} slug {slug}", event.user_id)),
                );
                self.send(event.chat_id, OutgoingMessage::plain(messages::REMOVE_FAILED))
                    .await
            }
        }
    }

    async fn show_registrations(&self, user_id: i64, chat_id: i64) -> Result<(), GatewayError> {
        let slugs = match Registration::list_active_for_user(&self.db.pool, user_id).await {
            Ok(slugs) => slugs,
            Err(e) => {
                log_store_error("SELECT", &e.to_string(), Some(&format!("user {user_id}")));
                return self
                    .send(chat_id, OutgoingMessage::plain(messages::SHOW_FAILED))
                    .await;
            }
        };

        if slugs.is_empty() {
            return self
                .send(chat_id, OutgoingMessage::plain(messages::NOT_REGISTERED))
                .await;
        }

        for slug in slugs {
            // The slug still identifies the entry when the directory is down.
            let label = match self.directory.get_status(&slug).await {
                Ok(status) => self.languages.resolve(&status.names),
                Err(e) => {
                    warn!("Failed to fetch details for {}: {}", slug, e);
                    slug.clone()
                }
            };

            let mut message = OutgoingMessage::plain(label);
            match (CallbackAction::Remove { slug: slug.clone() }).encode() {
                Some(payload) => {
                    message = message.with_keyboard(vec![vec![Button::new(messages::REMOVE, payload)]])
                }
                None => warn!("Registration {} for user {} has no removable payload", slug, user_id),
            }
            self.send(chat_id, message).await?;
        }

        Ok(())
    }

    async fn send(&self, chat_id: i64, message: OutgoingMessage) -> Result<(), GatewayError> {
        self.gateway.send_message(chat_id, message).await
    }

    /// Replaces the message that carried the button, or sends a new one if
    /// it is no longer accessible.
    async fn reply(&self, event: &CallbackEvent, message: OutgoingMessage) -> Result<(), GatewayError> {
        match event.message_id {
            Some(message_id) => {
                self.gateway
                    .edit_message(event.chat_id, message_id, message)
                    .await
            }
            None => self.send(event.chat_id, message).await,
        }
    }
}
