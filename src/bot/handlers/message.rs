use std::sync::Arc;
use teloxide::prelude::*;

use super::HandlerResult;
use crate::bot::commands::Command;
use crate::bot::engine::ConversationEngine;

pub async fn command_handler(
    msg: Message,
    cmd: Command,
    engine: Arc<ConversationEngine>,
) -> HandlerResult {
    let Some(user_id) = msg.from().map(|u| u.id.0 as i64) else {
        return Ok(());
    };

    engine.handle_command(user_id, msg.chat.id.0, cmd).await?;
    Ok(())
}

/// Plain text feeds the restaurant search; stickers, photos and the like are ignored.
pub async fn text_handler(msg: Message, engine: Arc<ConversationEngine>) -> HandlerResult {
    let (Some(user_id), Some(text)) = (msg.from().map(|u| u.id.0 as i64), msg.text()) else {
        return Ok(());
    };

    engine.handle_text(user_id, msg.chat.id.0, text).await?;
    Ok(())
}
