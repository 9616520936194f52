//! GroqSeeker - Telegram bot for hosted LLM chat
//!
#![doc = "Main entry point for the GroqSeeker bot."]

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use groqseeker::bot::{Bot, BotHandler, TelegramClient};
use groqseeker::cli::{Cli, Commands};
use groqseeker::config::Config;
use groqseeker::conversation::{ConversationStore, Message, Topic};
use groqseeker::dispatch::ReplyDispatcher;
use groqseeker::predictor::{parse_rate, Predictor};
use groqseeker::providers::create_provider;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Bot => run_bot(config).await,
        Commands::Ask { topic, prompt } => {
            let topic: Topic = topic.parse()?;
            run_ask(&config, topic, &prompt.join(" ")).await
        }
        Commands::Predict { rate } => {
            let rate = parse_rate(&rate)?;
            let predictor = Predictor::load(&config.predictor.model_path);
            println!("{}", predictor.predict_reply(rate).green());
            Ok(())
        }
    }
}

async fn run_bot(config: Config) -> Result<()> {
    let token = config.require_telegram_token()?.to_string();
    let provider: Arc<dyn groqseeker::providers::CompletionProvider> =
        Arc::from(create_provider(&config)?);

    let store = Arc::new(ConversationStore::new(config.conversation.max_tokens));
    let predictor = Arc::new(Predictor::load(&config.predictor.model_path));
    let handler = BotHandler::new(store, provider, predictor);

    let client = Arc::new(TelegramClient::new(&config.telegram, &token)?);
    let dispatcher = ReplyDispatcher::new(config.conversation.max_chunk_size);

    tracing::info!(
        max_tokens = config.conversation.max_tokens,
        max_chunk_size = config.conversation.max_chunk_size,
        "Starting GroqSeeker bot"
    );
    Bot::new(client, handler, dispatcher).run().await
}

async fn run_ask(config: &Config, topic: Topic, prompt: &str) -> Result<()> {
    let provider = create_provider(config)?;
    tracing::debug!(%topic, model = %provider.model_for(topic), "Sending single question");

    let reply = provider.complete(topic, &[Message::user(prompt)]).await?;
    println!("{} {}", format!("[{}]", topic.display_name()).cyan().bold(), reply);
    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "groqseeker=debug"
    } else {
        "groqseeker=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
