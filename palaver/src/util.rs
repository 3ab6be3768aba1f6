//! Small convenience constructors for common types.

use crate::{Message, Role, SendMessageRequest, SessionRecord};
use pcommon::SessionId;

pub fn user_message(content: impl Into<String>) -> Message {
    Message::new(Role::User, content)
}

pub fn assistant_message(content: impl Into<String>) -> Message {
    Message::new(Role::Assistant, content)
}

pub fn session(id: impl Into<SessionId>, owner: impl Into<pcommon::UserId>) -> SessionRecord {
    SessionRecord::new(id, owner)
}

pub fn send(session_id: impl Into<SessionId>, content: impl Into<String>) -> SendMessageRequest {
    SendMessageRequest::new(session_id, content)
}
