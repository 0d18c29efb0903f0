use sibyl_llm::provider::{ChatMessage, Role};

use crate::types::{Turn, TurnRole};

/// Build the message list for an LLM call: exactly one system message first,
/// then the session history interleaved, the newest user payload last.
pub fn build_messages(system: &str, history: &[Turn], user_payload: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));

    for turn in history {
        let role = match turn.role {
            TurnRole::User => Role::User,
            TurnRole::Assistant => Role::Assistant,
        };
        messages.push(ChatMessage { role, content: turn.content.clone() });
    }

    messages.push(ChatMessage::user(user_payload));
    messages
}
