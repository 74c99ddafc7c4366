use comfy_table::{Cell, Color, ContentArrangement, Table};
use incident_chat_core::render::{RenderedBody, TicketTable};
use incident_chat_core::ChatReply;

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers.iter().map(|h| Cell::new(*h).fg(Color::Cyan)).collect::<Vec<_>>());
    table
}

fn tickets_table(tickets: &TicketTable) -> Table {
    let mut table = new_table(&tickets.headers);
    for row in &tickets.rows {
        table.add_row(row.iter().map(Cell::new).collect::<Vec<_>>());
    }
    table
}

/// Formats a reply for stdout: text as-is, tickets as a table, anything else as JSON.
pub fn format_reply(reply: &ChatReply, format: &OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(reply)
            .unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}")),
        OutputFormat::Table => match RenderedBody::from_reply(reply) {
            RenderedBody::Text(text) => text,
            RenderedBody::Table(tickets) if tickets.is_empty() => "No tickets.".to_string(),
            RenderedBody::Table(tickets) => tickets_table(&tickets).to_string(),
        },
    }
}

pub fn print_reply(reply: &ChatReply, format: &OutputFormat) {
    println!("{}", format_reply(reply, format));
}

#[cfg(test)]
mod tests {
    use super::*;
    use incident_chat_core::TicketRecord;
    use serde_json::json;

    #[test]
    fn test_text_reply_is_printed_verbatim() {
        let reply = ChatReply::Text("Total tickets: 4".into());
        assert_eq!(format_reply(&reply, &OutputFormat::Table), "Total tickets: 4");
    }

    #[test]
    fn test_ticket_reply_becomes_table() {
        let reply = ChatReply::Tickets(vec![TicketRecord::new("T1", "Acme", "open", "2024-01-01")]);
        let out = format_reply(&reply, &OutputFormat::Table);
        assert!(out.contains("Ticket ID"));
        assert!(out.contains("Created Date"));
        assert!(out.contains("Acme"));
        assert!(out.contains("2024-01-01"));
    }

    #[test]
    fn test_grouped_reply_as_json_text() {
        let reply = ChatReply::Other(json!({"Acme": 2}));
        assert_eq!(format_reply(&reply, &OutputFormat::Table), r#"{"Acme":2}"#);
    }

    #[test]
    fn test_json_format() {
        let reply = ChatReply::Text("hi".into());
        assert_eq!(format_reply(&reply, &OutputFormat::Json), "\"hi\"");
    }
}
