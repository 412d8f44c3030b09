//! Survey domain module.
//!
//! A survey broadcasts one question to one chat and waits for a target
//! number of replies. Completion is reached when recorded responses meet
//! the expected count; the transition is monotonic and irreversible.

mod aggregate;
mod errors;
mod messages;
mod request;
mod response;
mod results;

pub use aggregate::Survey;
pub use errors::SurveyError;
pub use messages::{broadcast_text, reminder_text};
pub use request::{parse_extraction, ExtractedRequest, SurveyRequest, MAX_QUESTION_LENGTH};
pub use response::Response;
pub use results::SurveyResults;
