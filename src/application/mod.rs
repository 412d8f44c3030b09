//! Application layer - Services and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports:
//! - `SurveyLifecycle` owns survey state transitions
//! - `CompletionWaiter` waits for completion and sends reminders
//! - `ReplyRelay` routes inbound chat replies to surveys
//! - `handlers` run end-to-end flows

mod completion_waiter;
pub mod handlers;
mod reply_relay;
mod survey_lifecycle;

pub use completion_waiter::{CompletionWaiter, WaitError, WaitHandle, WaitSettings};
pub use handlers::{
    CollectSurveyCommand, CollectSurveyError, CollectSurveyHandler, CollectSurveyResult,
};
pub use reply_relay::{RelayedBatch, ReplyRelay, ReplyRelayConfig};
pub use survey_lifecycle::{RecordedResponse, SurveyLifecycle};
