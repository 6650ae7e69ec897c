/// Inline button payload encoding
pub mod callback_data;
/// Bot commands
pub mod commands;
/// Conversation state machine
pub mod engine;
/// Outbound chat transport
pub mod gateway;
/// Update routing from the Telegram dispatcher
pub mod handlers;
/// User-facing texts
pub mod messages;
/// Per-user conversation state
pub mod session;
