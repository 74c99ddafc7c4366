//! Display model for a conversation.
//!
//! Rendering is a pure function of the conversation snapshot; front ends
//! (the terminal widget, the one-shot printer) draw from [`RenderedEntry`].

use uuid::Uuid;

use crate::conversation::Conversation;
use crate::models::{ChatReply, Content, Delivery, MessageEntry, Role, TicketRecord};

pub const TICKET_HEADERS: [&str; 4] = ["Ticket ID", "Company", "Status", "Created Date"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

impl From<Role> for Alignment {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Alignment::Right,
            Role::Bot => Alignment::Left,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketTable {
    pub headers: [&'static str; 4],
    pub rows: Vec<[String; 4]>,
}

impl TicketTable {
    pub fn from_records(records: &[TicketRecord]) -> Self {
        Self {
            headers: TICKET_HEADERS,
            rows: records.iter().map(TicketRecord::cells).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest cell per column, header included.
    pub fn column_widths(&self) -> [usize; 4] {
        let mut widths = self.headers.map(|h| h.chars().count());
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedBody {
    Text(String),
    Table(TicketTable),
}

impl RenderedBody {
    pub fn from_content(content: &Content) -> Self {
        match content {
            Content::Text(text) => RenderedBody::Text(text.clone()),
            Content::Tickets(records) => RenderedBody::Table(TicketTable::from_records(records)),
        }
    }

    pub fn from_reply(reply: &ChatReply) -> Self {
        Self::from_content(&Content::from(reply.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    pub id: Uuid,
    pub role: Role,
    pub alignment: Alignment,
    pub body: RenderedBody,
    pub delivery: Delivery,
    pub time: String,
}

pub fn render_entry(entry: &MessageEntry) -> RenderedEntry {
    RenderedEntry {
        id: entry.id,
        role: entry.role,
        alignment: Alignment::from(entry.role),
        body: RenderedBody::from_content(&entry.content),
        delivery: entry.delivery.clone(),
        time: entry.sent_at.format("%H:%M").to_string(),
    }
}

pub fn render_conversation(conversation: &Conversation) -> Vec<RenderedEntry> {
    conversation.iter().map(render_entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_conversation() -> Conversation {
        Conversation::new()
            .append(MessageEntry::user("show open tickets for Acme"))
            .append(MessageEntry::bot(Content::Tickets(vec![TicketRecord::new(
                "T1",
                "Acme",
                "open",
                "2024-01-01",
            )])))
            .append(MessageEntry::bot("Total tickets: 1"))
    }

    #[test]
    fn test_ticket_reply_renders_fixed_columns() {
        let rendered = render_conversation(&sample_conversation());
        let RenderedBody::Table(ref table) = rendered[1].body else {
            panic!("expected a table");
        };
        assert_eq!(
            table.headers,
            ["Ticket ID", "Company", "Status", "Created Date"]
        );
        assert_eq!(table.rows.len(), 1);
        assert_eq!(
            table.rows[0],
            [
                "T1".to_string(),
                "Acme".to_string(),
                "open".to_string(),
                "2024-01-01".to_string()
            ]
        );
    }

    #[test]
    fn test_rows_keep_reply_order() {
        let records = vec![
            TicketRecord::new("T9", "Zeta", "open", "2024-03-01"),
            TicketRecord::new("T1", "Acme", "closed", "2024-01-01"),
        ];
        let table = TicketTable::from_records(&records);
        assert_eq!(table.rows[0][0], "T9");
        assert_eq!(table.rows[1][0], "T1");
    }

    #[test]
    fn test_alignment_follows_role() {
        let rendered = render_conversation(&sample_conversation());
        assert_eq!(rendered[0].alignment, Alignment::Right);
        assert_eq!(rendered[1].alignment, Alignment::Left);
        assert_eq!(rendered[2].body, RenderedBody::Text("Total tickets: 1".into()));
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let conversation = sample_conversation();
        let before = conversation.clone();
        let first = render_conversation(&conversation);
        let second = render_conversation(&conversation);
        assert_eq!(first, second);
        assert_eq!(conversation, before);
    }

    #[test]
    fn test_column_widths() {
        let table = TicketTable::from_records(&[TicketRecord::new(
            "INC-000123",
            "A",
            "in progress",
            "2024-01-01",
        )]);
        assert_eq!(table.column_widths(), [10, 7, 11, 12]);
    }

    #[test]
    fn test_raw_reply_renders_as_text() {
        let body = RenderedBody::from_reply(&ChatReply::Other(serde_json::json!({"open": 2})));
        assert_eq!(body, RenderedBody::Text(r#"{"open":2}"#.to_string()));
    }

    #[test]
    fn test_grouped_reply_keeps_server_key_order() {
        let reply =
            crate::transport::parse_reply(br#"{"reply": {"1": 4, "2": 1, "10": 3, "12": 2}}"#)
                .unwrap();
        assert_eq!(
            RenderedBody::from_reply(&reply),
            RenderedBody::Text(r#"{"1":4,"2":1,"10":3,"12":2}"#.to_string())
        );
    }
}
