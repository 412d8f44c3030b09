//! Messaging adapters.
//!
//! - `TelegramGateway` - Telegram Bot API (send + long-poll receive)
//! - `RecordingGateway` - in-memory capture for tests and dry runs
//! - `QueuedReplySource` - in-memory inbound replies

mod queued_reply_source;
mod recording_gateway;
mod telegram;

pub use queued_reply_source::QueuedReplySource;
pub use recording_gateway::{RecordingGateway, SentMessage};
pub use telegram::{TelegramConfig, TelegramGateway};
