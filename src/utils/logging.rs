use tracing::{debug, error, info, warn};

/// Logs the start of handling a chat event
pub fn log_event_start(event: &str, user_id: i64, chat_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!("EVENT_START: {} by user {} in chat {} - {}", event, user_id, chat_id, d),
        None => info!("EVENT_START: {} by user {} in chat {}", event, user_id, chat_id),
    }
}

/// Logs a failure surfaced to the user as a retry prompt
pub fn log_event_error(event: &str, user_id: i64, chat_id: i64, error: &str) {
    error!("EVENT_ERROR: {} by user {} in chat {} - {}", event, user_id, chat_id, error);
}

/// Logs input rejected before reaching the directory
pub fn log_validation_error(event: &str, error: &str, user_id: i64, chat_id: i64) {
    warn!("VALIDATION_ERROR: {} - {} - user {} in chat {}", event, error, user_id, chat_id);
}

/// Logs store operations with consistent format
pub fn log_store_operation(operation: &str, details: Option<&str>) {
    match details {
        Some(d) => debug!("DB_OP: {} on registrations - {}", operation, d),
        None => debug!("DB_OP: {} on registrations", operation),
    }
}

/// Logs store errors with consistent format
pub fn log_store_error(operation: &str, error: &str, details: Option<&str>) {
    match details {
        Some(d) => error!("DB_ERROR: {} on registrations failed: {} - {}", operation, error, d),
        None => error!("DB_ERROR: {} on registrations failed: {}", operation, error),
    }
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
