//! Request interpreter adapters.

mod anthropic_interpreter;
mod static_interpreter;

pub use anthropic_interpreter::{AnthropicConfig, AnthropicInterpreter};
pub use static_interpreter::StaticInterpreter;
