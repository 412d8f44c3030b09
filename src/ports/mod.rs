//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the survey core and the outside world. Adapters implement these ports.
//!
//! - `SurveyStore` - Survey and response persistence, one active survey per chat
//! - `MessagingGateway` - Outbound text delivery (broadcasts, reminders)
//! - `ReplySource` - Inbound replies from chats
//! - `RequestInterpreter` - Free text to survey parameters

mod messaging_gateway;
mod reply_source;
mod request_interpreter;
mod survey_store;

pub use messaging_gateway::{DeliveryError, DeliveryReceipt, MessagingGateway};
pub use reply_source::{InboundReply, ReplySource, ReplySourceError};
pub use request_interpreter::{InterpretError, RequestInterpreter};
pub use survey_store::SurveyStore;
