use clap::{Parser, Subcommand};

use survey_relay::config::SurveyConfig;

/// Top-level CLI parser for the `survey-relay` binary.
#[derive(Debug, Parser)]
#[command(
    name = "survey-relay",
    version,
    about = "Ask a Telegram chat a question and collect the answers"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Seconds to wait for all responses (overrides configuration)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Seconds between reminders (overrides configuration)
    #[arg(long, global = true)]
    pub reminder_secs: Option<u64>,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Interpret a free-text request, run the survey and print the answers
    Ask {
        /// e.g. "Ask 3 people in group -123456 what they want for lunch"
        request: String,
    },

    /// Run a survey with explicit parameters
    Survey {
        /// Target chat (group ids are negative)
        #[arg(long, allow_negative_numbers = true)]
        chat_id: i64,

        /// Question to broadcast
        #[arg(long)]
        question: String,

        /// Responses needed to complete
        #[arg(long, default_value_t = 1)]
        expected: u32,
    },

    /// Show the active survey of a chat (needs a persistent data dir)
    Status {
        #[arg(long, allow_negative_numbers = true)]
        chat_id: i64,
    },

    /// Send a single message to a chat
    Send {
        #[arg(long, allow_negative_numbers = true)]
        chat_id: i64,

        #[arg(long)]
        message: String,
    },
}

impl Cli {
    /// Apply command-line timer overrides to the survey configuration.
    pub fn apply_overrides(&self, survey: &mut SurveyConfig) {
        if let Some(timeout) = self.timeout_secs {
            survey.timeout_secs = timeout;
        }
        if let Some(reminder) = self.reminder_secs {
            survey.reminder_interval_secs = reminder;
        }
    }
}
