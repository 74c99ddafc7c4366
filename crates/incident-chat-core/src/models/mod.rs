pub mod message;
pub mod ticket;

pub use message::*;
pub use ticket::*;
