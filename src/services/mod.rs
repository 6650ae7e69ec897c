/// Health check HTTP endpoints
pub mod health;
/// Scheduled reopening checks
pub mod notifier;
