//! System-prompt text and message assembly for the completion gateway.

mod compose;
mod persona;

pub use compose::build_messages;
pub use persona::build_system_prompt;
