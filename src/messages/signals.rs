//! User-visible signals produced by the coordinators.
//!
//! The shell decides how to render them (toast, status line, stdout); the
//! core only guarantees when they fire.

use crate::api::models::Conversation;

pub const SENT: &str = "Message sent!";
pub const SEND_FAILED: &str = "Failed to send message";
pub const BROADCAST_SENT: &str = "Message sent to all passengers!";
pub const BROADCAST_FAILED: &str = "Failed to send bulk message";
pub const EMPTY_MESSAGE: &str = "Message cannot be empty";
pub const NOTHING_SELECTED: &str = "Select a conversation to start messaging";
pub const LOAD_FAILED: &str = "Failed to load messages";

/// Success/failure feedback for a completed attempt.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn failure(&self, message: &str);
}

/// Tells the shell to switch its focused view.
pub trait Navigator: Send + Sync {
    fn conversation_selected(&self, conversation: &Conversation);
}

/// Navigator for shells without a separate conversation view.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoNavigation;

impl Navigator for NoNavigation {
    fn conversation_selected(&self, _conversation: &Conversation) {}
}
