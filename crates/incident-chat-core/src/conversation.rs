//! Append-only conversation state.
//!
//! Every update returns a new [`Conversation`] value with a higher version;
//! the value it was derived from is left untouched, so snapshots handed to
//! the renderer never change underneath it.

use std::sync::Arc;

use uuid::Uuid;

use crate::models::{Delivery, MessageEntry, Role};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    entries: Arc<Vec<MessageEntry>>,
    version: u64,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, entry: MessageEntry) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.extend(self.entries.iter().cloned());
        entries.push(entry);
        Self {
            entries: Arc::new(entries),
            version: self.version + 1,
        }
    }

    /// Returns a copy where the user entry `id` carries `delivery`.
    ///
    /// Role, content and ordering are never touched. An unknown id, or an id
    /// naming a bot entry, yields an identical value with the same version.
    pub fn mark_delivery(&self, id: Uuid, delivery: Delivery) -> Self {
        let Some(position) = self
            .entries
            .iter()
            .position(|e| e.id == id && e.role == Role::User)
        else {
            return self.clone();
        };

        let mut entries = (*self.entries).clone();
        entries[position].delivery = delivery;
        Self {
            entries: Arc::new(entries),
            version: self.version + 1,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn entries(&self) -> &[MessageEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageEntry> {
        self.entries.iter()
    }

    pub fn get(&self, id: Uuid) -> Option<&MessageEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of sends still waiting for a reply.
    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_pending()).count()
    }

    pub fn count_by_role(&self, role: Role) -> usize {
        self.entries.iter().filter(|e| e.role == role).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Content;

    #[test]
    fn test_new_conversation_is_empty() {
        let conversation = Conversation::new();
        assert!(conversation.is_empty());
        assert_eq!(conversation.version(), 0);
    }

    #[test]
    fn test_append_keeps_previous_value() {
        let empty = Conversation::new();
        let one = empty.append(MessageEntry::user("hi"));
        let two = one.append(MessageEntry::bot("hello"));

        assert!(empty.is_empty());
        assert_eq!(one.len(), 1);
        assert_eq!(two.len(), 2);
        assert_eq!(one.version(), 1);
        assert_eq!(two.version(), 2);
        assert_eq!(two.entries()[0], one.entries()[0]);
        assert_eq!(two.entries()[1].content, Content::Text("hello".into()));
    }

    #[test]
    fn test_append_preserves_order() {
        let mut conversation = Conversation::new();
        for text in ["a", "b", "c"] {
            conversation = conversation.append(MessageEntry::user(text));
        }
        let texts: Vec<_> = conversation.iter().filter_map(|e| e.text()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_mark_delivery_updates_only_status() {
        let entry = MessageEntry::user("count open tickets");
        let id = entry.id;
        let before = Conversation::new().append(entry);
        let after = before.mark_delivery(id, Delivery::Failed("offline".into()));

        assert!(before.get(id).unwrap().is_pending());
        assert!(after.get(id).unwrap().is_failed());
        assert_eq!(after.get(id).unwrap().content, before.get(id).unwrap().content);
        assert_eq!(after.version(), before.version() + 1);
    }

    #[test]
    fn test_mark_delivery_ignores_unknown_and_bot_ids() {
        let bot = MessageEntry::bot("hello");
        let bot_id = bot.id;
        let conversation = Conversation::new().append(bot);

        let unchanged = conversation.mark_delivery(Uuid::new_v4(), Delivery::Delivered);
        assert_eq!(unchanged, conversation);

        let unchanged = conversation.mark_delivery(bot_id, Delivery::Failed("x".into()));
        assert_eq!(unchanged, conversation);
    }

    #[test]
    fn test_pending_count() {
        let first = MessageEntry::user("one");
        let first_id = first.id;
        let conversation = Conversation::new()
            .append(first)
            .append(MessageEntry::user("two"));
        assert_eq!(conversation.pending_count(), 2);

        let conversation = conversation.mark_delivery(first_id, Delivery::Delivered);
        assert_eq!(conversation.pending_count(), 1);
        assert_eq!(conversation.count_by_role(Role::User), 2);
    }
}
