//! Task chat: a thin append-only log. The sender is always the authenticated
//! principal; no ownership resolution beyond that.

use taskhub_storage::{ChatMessage, CreateChatMessageParams, MessageType, Store, TaskId};

use crate::error::{CoreError, CoreResult};
use crate::Principal;

pub async fn post_message(
    store: &dyn Store,
    principal: &Principal,
    task_id: &TaskId,
    message: &str,
    message_type: Option<MessageType>,
) -> CoreResult<ChatMessage> {
    if message.trim().is_empty() {
        return Err(CoreError::validation("Message is required"));
    }
    Ok(store
        .create_chat_message(&CreateChatMessageParams {
            task_id: task_id.clone(),
            sender: principal.id.clone(),
            message: message.to_string(),
            message_type: message_type.unwrap_or(MessageType::Comment),
        })
        .await?)
}

pub async fn task_log(store: &dyn Store, task_id: &TaskId) -> CoreResult<Vec<ChatMessage>> {
    Ok(store.list_chat_messages(task_id).await?)
}
