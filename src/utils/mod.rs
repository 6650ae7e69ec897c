/// Stored timestamp formatting
pub mod datetime;
/// HTML escaping for formatted messages
pub mod html;
/// Consistent log lines for events and store access
pub mod logging;
/// Input checks for user-supplied text
pub mod validation;
