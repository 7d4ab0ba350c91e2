//! # Messages
//!
//! User-facing replies sent by the built-in commands.

pub const CHECK_MARK: &str = ":heavy_check_mark:";

pub const MISSING_MESSAGE: &str = "Must provide a message.";

pub fn nothing_stored(prefix: &str) -> String {
    format!("No message has been set yet. Send `{prefix}set <message>` to set one.")
}

pub fn stored_message(message: &str) -> String {
    format!("📌 {message}")
}

pub const MESSAGE_FORGOTTEN: &str = "🧹 Stored message cleared.";

pub const HELP_HEADER: &str = "**🤖 Commands**";

pub fn help_line(prefix: &str, name: &str, usage: Option<&str>, description: &str) -> String {
    match usage {
        Some(usage) => format!("* `{prefix}{name} {usage}`: {description}"),
        None => format!("* `{prefix}{name}`: {description}"),
    }
}
