//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the survey core to external systems:
//! - `storage` - Survey stores (in-memory, YAML files)
//! - `messaging` - Chat transports (Telegram, recording)
//! - `interpreter` - Request interpreters (Anthropic, scripted)

pub mod interpreter;
pub mod messaging;
pub mod storage;

pub use interpreter::{AnthropicConfig, AnthropicInterpreter, StaticInterpreter};
pub use messaging::{QueuedReplySource, RecordingGateway, SentMessage, TelegramConfig, TelegramGateway};
pub use storage::{FileSurveyStore, InMemorySurveyStore};
