pub mod conversation;
pub mod input;
