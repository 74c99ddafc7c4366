//! Incident tickets loaded once from CSV at startup.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::{ServerError, ServerResult};

const TIMESTAMP_OUTPUT: &str = "%Y-%m-%dT%H:%M:%S";

const KNOWN_COLUMNS: [&str; 8] = [
    "ticket_id",
    "company",
    "status",
    "priority",
    "category",
    "assigned_to",
    "created_date",
    "closed_date",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Incident {
    pub ticket_id: String,
    pub company: String,
    pub status: String,
    pub priority: String,
    pub category: String,
    pub assigned_to: String,
    pub created_date: NaiveDateTime,
    pub closed_date: Option<NaiveDateTime>,
    /// Columns outside the known set, in file order.
    pub extra: Vec<(String, String)>,
}

impl Incident {
    /// Value of a filterable or groupable text column.
    pub fn column(&self, name: &str) -> Option<&str> {
        match name {
            "ticket_id" => Some(&self.ticket_id),
            "company" => Some(&self.company),
            "status" => Some(&self.status),
            "priority" => Some(&self.priority),
            "category" => Some(&self.category),
            "assigned_to" => Some(&self.assigned_to),
            other => self
                .extra
                .iter()
                .find(|(k, _)| k == other)
                .map(|(_, v)| v.as_str()),
        }
    }

    pub fn created_month(&self) -> u32 {
        self.created_date.month()
    }

    pub fn created_year(&self) -> i32 {
        self.created_date.year()
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("ticket_id".into(), Value::String(self.ticket_id.clone()));
        map.insert("company".into(), Value::String(self.company.clone()));
        map.insert("status".into(), Value::String(self.status.clone()));
        map.insert("priority".into(), Value::String(self.priority.clone()));
        map.insert("category".into(), Value::String(self.category.clone()));
        map.insert("assigned_to".into(), Value::String(self.assigned_to.clone()));
        map.insert(
            "created_date".into(),
            Value::String(self.created_date.format(TIMESTAMP_OUTPUT).to_string()),
        );
        map.insert(
            "closed_date".into(),
            self.closed_date
                .map(|d| Value::String(d.format(TIMESTAMP_OUTPUT).to_string()))
                .unwrap_or(Value::Null),
        );
        for (key, value) in &self.extra {
            map.insert(key.clone(), Value::String(value.clone()));
        }
        Value::Object(map)
    }
}

#[derive(Debug, Clone, Default)]
pub struct IncidentStore {
    incidents: Vec<Incident>,
}

impl IncidentStore {
    pub fn new(incidents: Vec<Incident>) -> Self {
        Self { incidents }
    }

    pub fn from_path(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let store = Self::from_reader(file)?;
        info!(path = %path.display(), tickets = store.len(), "incident dataset loaded");
        Ok(store)
    }

    pub fn from_reader<R: Read>(reader: R) -> ServerResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect();

        for required in ["ticket_id", "created_date"] {
            if !headers.iter().any(|h| h == required) {
                return Err(ServerError::Dataset {
                    record: 0,
                    message: format!("missing required column '{}'", required),
                });
            }
        }

        let mut incidents = Vec::new();
        for (index, record) in csv_reader.records().enumerate() {
            let record = record?;
            let record_no = index as u64 + 1;
            let field = |name: &str| -> String {
                headers
                    .iter()
                    .position(|h| h == name)
                    .and_then(|i| record.get(i))
                    .unwrap_or_default()
                    .to_string()
            };

            let created_raw = field("created_date");
            let created_date = parse_timestamp(&created_raw).ok_or_else(|| ServerError::Dataset {
                record: record_no,
                message: format!("unparseable created_date '{}'", created_raw),
            })?;

            let extra = headers
                .iter()
                .zip(record.iter())
                .filter(|(h, _)| !KNOWN_COLUMNS.contains(&h.as_str()))
                .map(|(h, v)| (h.clone(), v.to_string()))
                .collect();

            incidents.push(Incident {
                ticket_id: field("ticket_id"),
                company: field("company"),
                status: field("status"),
                priority: field("priority"),
                category: field("category"),
                assigned_to: field("assigned_to"),
                created_date,
                closed_date: parse_timestamp(&field("closed_date")),
                extra,
            });
        }

        Ok(Self { incidents })
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Incident> {
        self.incidents.iter()
    }
}

/// Accepts plain dates, date-times with a space or `T`, and RFC 3339.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|parsed| parsed.naive_utc())
}
