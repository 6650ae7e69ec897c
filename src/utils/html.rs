//! Utility functions for Telegram's HTML parse mode
//!
//! Only `<`, `>`, `&` (and `"` inside attributes) need escaping.

/// Escapes text for use inside an HTML-formatted message.
///
/// # Example
/// ```
/// use wolt_checker_bot::utils::html::escape_html;
///
/// assert_eq!(escape_html("Fish & <Chips>"), "Fish &amp; &lt;Chips&gt;");
/// ```
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Bold link with escaped text and URL.
pub fn bold_link(url: &str, text: &str) -> String {
    format!(
        "<b><a href=\"{}\">{}</a></b>",
        escape_html(url).replace('"', "&quot;"),
        escape_html(text)
    )
}
