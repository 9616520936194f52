//! Command-line interface definition for GroqSeeker
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands to run the bot and to exercise its collaborators
//! one request at a time.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// GroqSeeker - Telegram bot for hosted LLM chat and DBS price prediction
#[derive(Parser, Debug, Clone)]
#[command(name = "groqseeker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the regression model artifact path
    #[arg(long)]
    pub model_path: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for GroqSeeker
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the Telegram bot until interrupted
    Bot,

    /// Send a single question to a chat model and print the reply
    Ask {
        /// Topic (model) to ask: llama or deepseek
        #[arg(short, long, default_value = "llama")]
        topic: String,

        /// Question text
        #[arg(required = true)]
        prompt: Vec<String>,
    },

    /// Predict the DBS share price from a USD/SGD rate
    Predict {
        /// USD/SGD exchange rate
        rate: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            model_path: None,
            command: Commands::Bot,
        }
    }
}
