pub mod config;
pub mod conversation;
pub mod error;
pub mod models;
pub mod render;
pub mod session;
pub mod transport;

pub use config::{ClientConfig, ConfigLoadError, LoggingConfig};
pub use conversation::Conversation;
pub use error::{ChatError, ChatResult};
pub use models::{ChatReply, Content, Delivery, MessageEntry, Role, TicketRecord};
pub use render::{render_conversation, RenderedBody, RenderedEntry, TicketTable, TICKET_HEADERS};
pub use session::ChatSession;
pub use transport::{ChatTransport, HttpTransport, DEFAULT_CHAT_ENDPOINT};
