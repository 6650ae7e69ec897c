use std::sync::Arc;
use teloxide::prelude::*;

use super::HandlerResult;
use crate::bot::engine::{CallbackEvent, ConversationEngine};

pub async fn callback_handler(q: CallbackQuery, engine: Arc<ConversationEngine>) -> HandlerResult {
    let user_id = q.from.id.0 as i64;
    let username = q.from.username.as_deref().unwrap_or("unknown");
    tracing::debug!("Callback {:?} from user {} ({})", q.data, username, user_id);

    // Private chats share the user's id when the message is gone.
    let chat_id = q.message.as_ref().map(|m| m.chat.id.0).unwrap_or(user_id);

    let event = CallbackEvent {
        callback_id: q.id.clone(),
        user_id,
        chat_id,
        message_id: q.message.as_ref().map(|m| m.id.0),
        data: q.data.clone().unwrap_or_default(),
    };

    engine.handle_callback(event).await?;
    Ok(())
}
