pub mod callback;
pub mod message;

use std::sync::Arc;
use teloxide::{
    dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler},
    prelude::*,
};

use crate::bot::commands::Command;
use crate::bot::engine::ConversationEngine;

/// Error type surfaced to the dispatcher's error handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type HandlerResult = Result<(), HandlerError>;

pub struct BotHandler {
    pub engine: Arc<ConversationEngine>,
}

impl BotHandler {
    pub fn new(engine: Arc<ConversationEngine>) -> Self {
        Self { engine }
    }

    /// Commands first, then any other text message, then button presses.
    pub fn schema(&self) -> UpdateHandler<HandlerError> {
        let engine_command = self.engine.clone();
        let engine_text = self.engine.clone();
        let engine_callback = self.engine.clone();

        dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |msg: Message, cmd: Command| {
                        let engine = engine_command.clone();
                        async move { message::command_handler(msg, cmd, engine).await }
                    }),
            )
            .branch(Update::filter_message().endpoint(move |msg: Message| {
                let engine = engine_text.clone();
                async move { message::text_handler(msg, engine).await }
            }))
            .branch(Update::filter_callback_query().endpoint(move |q: CallbackQuery| {
                let engine = engine_callback.clone();
                async move { callback::callback_handler(q, engine).await }
            }))
    }
}
