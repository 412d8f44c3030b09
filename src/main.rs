use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;

use survey_relay::adapters::{
    AnthropicInterpreter, FileSurveyStore, InMemorySurveyStore, TelegramGateway,
};
use survey_relay::application::{
    CollectSurveyCommand, CollectSurveyHandler, CollectSurveyResult, CompletionWaiter, ReplyRelay,
    SurveyLifecycle,
};
use survey_relay::config::AppConfig;
use survey_relay::domain::foundation::ChatId;
use survey_relay::domain::survey::SurveyRequest;
use survey_relay::ports::{MessagingGateway, SurveyStore};

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("survey-relay error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load().context("failed to load configuration")?;
    cli.apply_overrides(&mut config.survey);
    init_tracing(&config.log_level, cli.verbose)?;
    config.validate().context("invalid configuration")?;

    let telegram = Arc::new(
        TelegramGateway::new(config.telegram.gateway_config()?)
            .context("failed to create Telegram client")?,
    );

    if let Commands::Send { chat_id, message } = &cli.command {
        let receipt = telegram.send(ChatId::new(*chat_id), message).await?;
        println!("sent message {} to chat {}", receipt.message_id, receipt.chat_id);
        return Ok(());
    }

    let store: Arc<dyn SurveyStore> = match &config.storage.data_dir {
        Some(dir) => Arc::new(
            FileSurveyStore::open(dir)
                .await
                .with_context(|| format!("failed to open survey store at {}", dir.display()))?,
        ),
        None => Arc::new(InMemorySurveyStore::new()),
    };
    let lifecycle = Arc::new(SurveyLifecycle::new(store, telegram.clone()));

    if let Commands::Status { chat_id } = &cli.command {
        return print_status(&lifecycle, ChatId::new(*chat_id)).await;
    }

    let waiter = CompletionWaiter::with_settings(
        lifecycle.clone(),
        telegram.clone(),
        config.survey.wait_settings(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let relay = ReplyRelay::new(telegram.clone(), lifecycle.clone());
    let relay_task = tokio::spawn(async move { relay.run(shutdown_rx).await });

    let outcome = tokio::select! {
        outcome = collect(cli.command, &config, lifecycle, waiter) => outcome,
        _ = tokio::signal::ctrl_c() => Err(anyhow::anyhow!("interrupted")),
    };

    let _ = shutdown_tx.send(true);
    if let Err(e) = relay_task.await {
        tracing::warn!(error = %e, "Reply relay task failed");
    }

    println!("{}", outcome?.render());
    Ok(())
}

async fn collect(
    command: Commands,
    config: &AppConfig,
    lifecycle: Arc<SurveyLifecycle>,
    waiter: CompletionWaiter,
) -> anyhow::Result<CollectSurveyResult> {
    match command {
        Commands::Ask { request } => {
            let interpreter = AnthropicInterpreter::new(config.ai.anthropic_config()?)?;
            let handler = CollectSurveyHandler::new(Arc::new(interpreter), lifecycle, waiter);
            Ok(handler.handle(CollectSurveyCommand { request }).await?)
        }
        Commands::Survey {
            chat_id,
            question,
            expected,
        } => {
            let request = SurveyRequest::new(ChatId::new(chat_id), question, expected)?;
            let survey = lifecycle.create_from(&request).await?;
            tracing::info!(survey_id = %survey.id(), "Survey broadcast, waiting for responses");
            let results = waiter.await_completion(*survey.id()).await?;
            Ok(CollectSurveyResult { survey, results })
        }
        Commands::Send { .. } | Commands::Status { .. } => {
            anyhow::bail!("command does not run a survey")
        }
    }
}

async fn print_status(lifecycle: &SurveyLifecycle, chat_id: ChatId) -> anyhow::Result<()> {
    match lifecycle.active_survey(chat_id).await? {
        Some(survey) => {
            let recorded = lifecycle.response_count(survey.id()).await?;
            println!(
                "Survey {} in chat {}: {} ({}/{} responses, {})",
                survey.id(),
                chat_id,
                survey.question(),
                recorded,
                survey.expected_count(),
                survey.status()
            );
        }
        None => println!("No active survey in chat {chat_id}"),
    }
    Ok(())
}

fn init_tracing(level: &str, verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { level };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
