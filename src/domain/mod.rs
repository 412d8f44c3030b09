//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, statuses, errors)
//! - `survey` - Survey aggregate, responses, results projection, request parsing

pub mod foundation;
pub mod survey;
