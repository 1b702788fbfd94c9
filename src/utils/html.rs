//! Utility functions for Telegram's HTML parse mode
//!
//! Only `<`, `>` and `&` carry meaning in HTML mode, so user-provided text
//! (option labels, titles) has to be escaped before it is embedded in a
//! formatted message.

/// Escapes HTML special characters so the text is displayed literally
///
/// # Example
/// ```
/// use daily_poll_bot::utils::html::escape_html;
///
/// let escaped = escape_html("Fish & <Chips>");
/// assert_eq!(escaped, "Fish &amp; &lt;Chips&gt;");
/// ```
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Wraps already escaped text in a bold tag
pub fn bold(text: &str) -> String {
    format!("<b>{text}</b>")
}
