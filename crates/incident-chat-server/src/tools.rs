//! Deterministic ticket tools the model can call.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::dataset::{Incident, IncidentStore};
use crate::error::{ServerError, ServerResult};

pub const ALLOWED_FILTERS: [&str; 5] = ["company", "status", "priority", "category", "assigned_to"];

pub const ALLOWED_GROUP_BY: [&str; 6] = [
    "company",
    "status",
    "priority",
    "category",
    "assigned_to",
    "month",
];

pub const NO_TICKETS_FOUND: &str = "No tickets found matching the criteria.";
pub const INVALID_GROUP_BY: &str = "Invalid group_by column.";
pub const NO_GROUP_DATA: &str = "No data available for grouping.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketTool {
    CountTickets,
    FilterTickets,
    GroupByTickets,
}

impl TicketTool {
    pub fn all() -> &'static [TicketTool] {
        &[
            TicketTool::CountTickets,
            TicketTool::FilterTickets,
            TicketTool::GroupByTickets,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            TicketTool::CountTickets => "count_tickets",
            TicketTool::FilterTickets => "filter_tickets",
            TicketTool::GroupByTickets => "group_by_tickets",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TicketTool::CountTickets => "Count tickets using optional filters and date constraints",
            TicketTool::FilterTickets => "Retrieve ticket records using filters",
            TicketTool::GroupByTickets => "Group tickets by a column",
        }
    }

    /// Function definition in the chat-completions `tools` format.
    pub fn definition(&self) -> Value {
        let mut properties = json!({
            "filters": { "type": "object" },
            "date_filter": { "type": "object" }
        });
        let mut parameters = json!({ "type": "object" });

        if *self == TicketTool::GroupByTickets {
            properties["group_by"] = json!({ "type": "string" });
            parameters["required"] = json!(["group_by"]);
        }
        parameters["properties"] = properties;

        json!({
            "type": "function",
            "function": {
                "name": self.name(),
                "description": self.description(),
                "parameters": parameters
            }
        })
    }
}

impl FromStr for TicketTool {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TicketTool::all()
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| ServerError::Tool(format!("Unknown tool '{}'", s)))
    }
}

pub fn tool_definitions() -> Vec<Value> {
    TicketTool::all().iter().map(TicketTool::definition).collect()
}

#[derive(Debug, Default, Deserialize)]
pub struct ToolArgs {
    #[serde(default)]
    pub filters: Option<Map<String, Value>>,
    #[serde(default)]
    pub date_filter: Option<Map<String, Value>>,
    #[serde(default)]
    pub group_by: Option<String>,
}

impl ToolArgs {
    /// Parses the raw argument string of a tool call; blank means no arguments.
    pub fn parse(arguments: &str) -> ServerResult<Self> {
        if arguments.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(arguments)
            .map_err(|e| ServerError::Tool(format!("Invalid tool arguments: {}", e)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFilter {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl DateFilter {
    pub fn from_map(map: &Map<String, Value>) -> ServerResult<Self> {
        let month = match map.get("month") {
            Some(value) => Some(
                as_int(value)
                    .and_then(|m| u32::try_from(m).ok())
                    .ok_or_else(|| ServerError::Tool(format!("Invalid month: {}", value)))?,
            ),
            None => None,
        };
        let year = match map.get("year") {
            Some(value) => Some(
                as_int(value)
                    .and_then(|y| i32::try_from(y).ok())
                    .ok_or_else(|| ServerError::Tool(format!("Invalid year: {}", value)))?,
            ),
            None => None,
        };
        Ok(Self { month, year })
    }

    fn matches(&self, incident: &Incident) -> bool {
        self.month.map_or(true, |m| incident.created_month() == m)
            && self.year.map_or(true, |y| incident.created_year() == y)
    }
}

fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Case-insensitive equality on allowed columns, then the date constraints.
/// Filter keys outside [`ALLOWED_FILTERS`] are ignored.
pub fn apply_filters<'a>(
    store: &'a IncidentStore,
    filters: Option<&Map<String, Value>>,
    date_filter: Option<&DateFilter>,
) -> Vec<&'a Incident> {
    let wanted: Vec<(&str, String)> = filters
        .map(|f| {
            f.iter()
                .filter(|(col, _)| ALLOWED_FILTERS.contains(&col.as_str()))
                .map(|(col, value)| (col.as_str(), display_value(value).to_lowercase()))
                .collect()
        })
        .unwrap_or_default();

    store
        .iter()
        .filter(|incident| {
            wanted.iter().all(|(col, value)| {
                incident
                    .column(col)
                    .map_or(false, |actual| actual.to_lowercase() == *value)
            })
        })
        .filter(|incident| date_filter.map_or(true, |d| d.matches(incident)))
        .collect()
}

pub fn count_tickets(
    store: &IncidentStore,
    filters: Option<&Map<String, Value>>,
    date_filter: Option<&DateFilter>,
) -> Value {
    let matched = apply_filters(store, filters, date_filter);
    Value::String(format!("Total tickets: {}", matched.len()))
}

pub fn filter_tickets(
    store: &IncidentStore,
    filters: Option<&Map<String, Value>>,
    date_filter: Option<&DateFilter>,
) -> Value {
    let matched = apply_filters(store, filters, date_filter);
    if matched.is_empty() {
        return Value::String(NO_TICKETS_FOUND.to_string());
    }
    Value::Array(matched.iter().map(|i| i.to_json()).collect())
}

pub fn group_by_tickets(
    store: &IncidentStore,
    group_by: &str,
    filters: Option<&Map<String, Value>>,
    date_filter: Option<&DateFilter>,
) -> Value {
    if !ALLOWED_GROUP_BY.contains(&group_by) {
        return Value::String(INVALID_GROUP_BY.to_string());
    }

    let matched = apply_filters(store, filters, date_filter);
    if matched.is_empty() {
        return Value::String(NO_GROUP_DATA.to_string());
    }

    // Map keeps insertion order, so months come out numerically.
    let mut groups = Map::new();
    if group_by == "month" {
        let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
        for incident in &matched {
            *counts.entry(incident.created_month()).or_default() += 1;
        }
        for (month, count) in counts {
            groups.insert(month.to_string(), json!(count));
        }
    } else {
        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for incident in &matched {
            let key = incident.column(group_by).unwrap_or_default();
            *counts.entry(key).or_default() += 1;
        }
        for (key, count) in counts {
            groups.insert(key.to_string(), json!(count));
        }
    }
    Value::Object(groups)
}

/// Runs the tool named by a model tool call against the dataset.
pub fn run_tool(store: &IncidentStore, name: &str, arguments: &str) -> ServerResult<Value> {
    let tool = TicketTool::from_str(name)?;
    let args = ToolArgs::parse(arguments)?;
    let date_filter = args
        .date_filter
        .as_ref()
        .map(DateFilter::from_map)
        .transpose()?;
    let filters = args.filters.as_ref();

    let result = match tool {
        TicketTool::CountTickets => count_tickets(store, filters, date_filter.as_ref()),
        TicketTool::FilterTickets => filter_tickets(store, filters, date_filter.as_ref()),
        TicketTool::GroupByTickets => {
            let group_by = args.group_by.as_deref().ok_or_else(|| {
                ServerError::Tool("group_by_tickets requires a group_by argument".to_string())
            })?;
            group_by_tickets(store, group_by, filters, date_filter.as_ref())
        }
    };
    Ok(result)
}
