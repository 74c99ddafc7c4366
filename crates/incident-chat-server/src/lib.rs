pub mod config;
pub mod dataset;
pub mod error;
pub mod http;
pub mod planner;
pub mod tools;

pub use config::{OpenAiConfig, ServerConfig};
pub use dataset::{Incident, IncidentStore};
pub use error::{ServerError, ServerResult};
pub use http::{router, serve, AppState, AppStateInner, REFUSAL};
pub use planner::{OpenAiPlanner, PlannedCall, ToolPlanner};
pub use tools::{run_tool, tool_definitions, TicketTool};
