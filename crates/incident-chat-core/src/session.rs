//! The task that owns the conversation.
//!
//! The widget never mutates the conversation directly. It sends commands to
//! the session task and observes published snapshots through a `watch`
//! channel. Sends are not serialized: every transport call runs on its own
//! task and replies are appended in completion order.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::conversation::Conversation;
use crate::error::{ChatError, ChatResult};
use crate::models::{ChatReply, Content, Delivery, MessageEntry};
use crate::transport::ChatTransport;

enum Command {
    Send(String),
    Shutdown,
}

struct Completion {
    entry_id: Uuid,
    result: ChatResult<ChatReply>,
}

#[derive(Clone)]
pub struct ChatSession {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<Conversation>,
}

impl ChatSession {
    /// Starts the owning task. Must be called inside a tokio runtime.
    pub fn spawn(transport: Arc<dyn ChatTransport>) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(Conversation::new());

        tokio::spawn(run(transport, commands_rx, state_tx));

        Self {
            commands: commands_tx,
            state: state_rx,
        }
    }

    /// Queues `text` for sending. Empty text is ignored.
    pub fn send(&self, text: impl Into<String>) -> ChatResult<()> {
        let text = text.into();
        if text.is_empty() {
            return Ok(());
        }
        self.commands
            .send(Command::Send(text))
            .map_err(|_| ChatError::SessionClosed)
    }

    pub fn snapshot(&self) -> Conversation {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Conversation> {
        self.state.clone()
    }

    /// Waits until a published snapshot satisfies `predicate`.
    pub async fn wait_for<F>(&self, mut predicate: F) -> ChatResult<Conversation>
    where
        F: FnMut(&Conversation) -> bool,
    {
        let mut state = self.state.clone();
        let conversation = state
            .wait_for(|c| predicate(c))
            .await
            .map_err(|_| ChatError::SessionClosed)?;
        Ok(conversation.clone())
    }

    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }
}

async fn run(
    transport: Arc<dyn ChatTransport>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    state: watch::Sender<Conversation>,
) {
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();
    let mut conversation = Conversation::new();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Send(text)) => {
                    let entry = MessageEntry::user(text.clone());
                    let entry_id = entry.id;
                    conversation = conversation.append(entry);
                    state.send_replace(conversation.clone());
                    debug!(%entry_id, pending = conversation.pending_count(), "message queued");

                    let transport = Arc::clone(&transport);
                    let done = done_tx.clone();
                    tokio::spawn(async move {
                        let result = transport.send_message(&text).await;
                        let _ = done.send(Completion { entry_id, result });
                    });
                }
                Some(Command::Shutdown) | None => break,
            },
            Some(completion) = done_rx.recv() => {
                conversation = apply_completion(&conversation, completion);
                state.send_replace(conversation.clone());
            }
        }
    }

    info!("chat session stopped");
}

fn apply_completion(conversation: &Conversation, completion: Completion) -> Conversation {
    match completion.result {
        Ok(reply) => conversation
            .mark_delivery(completion.entry_id, Delivery::Delivered)
            .append(MessageEntry::bot(Content::from(reply))),
        Err(e) => {
            warn!(entry_id = %completion.entry_id, error = %e, "chat request failed");
            conversation.mark_delivery(completion.entry_id, Delivery::Failed(e.summary()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_successful_completion_appends_bot_entry() {
        let user = MessageEntry::user("hi");
        let id = user.id;
        let conversation = Conversation::new().append(user);

        let next = apply_completion(
            &conversation,
            Completion {
                entry_id: id,
                result: Ok(ChatReply::Text("hello".into())),
            },
        );

        assert_eq!(next.len(), 2);
        assert_eq!(next.get(id).unwrap().delivery, Delivery::Delivered);
        assert_eq!(next.entries()[1].role, Role::Bot);
        assert_eq!(next.entries()[1].text(), Some("hello"));
    }

    #[test]
    fn test_failed_completion_marks_entry() {
        let user = MessageEntry::user("hi");
        let id = user.id;
        let conversation = Conversation::new().append(user);

        let next = apply_completion(
            &conversation,
            Completion {
                entry_id: id,
                result: Err(ChatError::MissingReply),
            },
        );

        assert_eq!(next.len(), 1);
        assert_eq!(
            next.get(id).unwrap().delivery,
            Delivery::Failed("response has no reply field".into())
        );
    }
}
