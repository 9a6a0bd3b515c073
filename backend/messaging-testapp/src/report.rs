//! Rendering of received tokens and messages into report lines
//!
//! Absent fields produce no line at all.
use nova_messaging_shared::Message;

pub fn token_line(token: &str) -> String {
    format!("Received registration token: {token}")
}

pub fn message_lines(message: &Message) -> Vec<String> {
    let mut lines = vec!["Received a new message".to_string()];

    if let Some(opened) = message.notification_opened {
        lines.push(format!(
            "This message was {} by the user",
            if opened { "opened" } else { "not opened" }
        ));
    }
    if let Some(from) = &message.from {
        lines.push(format!("from: {from}"));
    }
    if let Some(error) = &message.error {
        lines.push(format!("error: {error}"));
    }
    if let Some(message_id) = &message.message_id {
        lines.push(format!("message_id: {message_id}"));
    }
    if !message.data.is_empty() {
        lines.push("data:".to_string());
        lines.extend(
            message
                .data
                .iter()
                .map(|(key, value)| format!("  {key}: {value}")),
        );
    }
    if let Some(notification) = &message.notification {
        lines.push("notification:".to_string());
        lines.extend(
            notification
                .fields()
                .into_iter()
                .map(|(name, value)| format!("  {name}: {value}")),
        );
    }

    lines
}
