//! Survey Relay - ask a chat a question and collect the answers.
//!
//! A survey broadcasts one question to a chat, records replies until an
//! expected number has arrived and then exposes the answers. A waiter
//! blocks until completion, nudging the chat with reminders, and gives up
//! after a timeout.
//!
//! The crate follows a hexagonal layout: `domain` holds the pure types and
//! rules, `ports` the traits for collaborators, `adapters` their
//! implementations and `application` the services that tie them together.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
