//! Survey handlers.

mod collect_survey;

pub use collect_survey::{
    CollectSurveyCommand, CollectSurveyError, CollectSurveyHandler, CollectSurveyResult,
};
