use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One support ticket row as returned by the chat service.
///
/// Fields are opaque display strings. Numbers and booleans are stringified,
/// `null` or missing fields become empty strings and unknown fields are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    #[serde(default, deserialize_with = "display_string")]
    pub ticket_id: String,
    #[serde(default, deserialize_with = "display_string")]
    pub company: String,
    #[serde(default, deserialize_with = "display_string")]
    pub status: String,
    #[serde(default, deserialize_with = "display_string")]
    pub created_date: String,
}

impl TicketRecord {
    pub fn new(
        ticket_id: impl Into<String>,
        company: impl Into<String>,
        status: impl Into<String>,
        created_date: impl Into<String>,
    ) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            company: company.into(),
            status: status.into(),
            created_date: created_date.into(),
        }
    }

    pub fn cells(&self) -> [String; 4] {
        [
            self.ticket_id.clone(),
            self.company.clone(),
            self.status.clone(),
            self.created_date.clone(),
        ]
    }
}

fn display_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// The `reply` field of a chat response, taken verbatim.
///
/// The runtime shape decides the variant: a string is text, an array of
/// objects is a ticket list, anything else is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, from = "Value")]
pub enum ChatReply {
    Text(String),
    Tickets(Vec<TicketRecord>),
    Other(Value),
}

impl From<Value> for ChatReply {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            Value::Array(items) if items.iter().all(Value::is_object) => {
                let array = Value::Array(items);
                match serde_json::from_value::<Vec<TicketRecord>>(array.clone()) {
                    Ok(records) => Self::Tickets(records),
                    Err(_) => Self::Other(array),
                }
            }
            other => Self::Other(other),
        }
    }
}
