//! Application handlers.
//!
//! Command handlers that run a complete flow on top of the services.

pub mod survey;

pub use survey::{
    CollectSurveyCommand, CollectSurveyError, CollectSurveyHandler, CollectSurveyResult,
};
