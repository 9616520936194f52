//! Bot command parser
//!
//! Commands are prefixed with `/`, matched case-insensitively, and may carry
//! the `@botname` suffix Telegram appends in group chats. Anything that does
//! not start with `/` is plain text.

use crate::conversation::Topic;

/// A parsed inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum BotCommand {
    /// `/start`: welcome message
    Start,

    /// `/help`: command list
    Help,

    /// `/<topic> <text>`: chat with the model behind a topic
    ///
    /// `text` is the argument words joined by single spaces and may be
    /// empty.
    Chat {
        /// Topic the question is addressed to
        topic: Topic,
        /// Question text
        text: String,
    },

    /// `/predict [rate]`: predict, or recall the last rate when no argument
    Predict(Option<String>),

    /// `/reset`: clear chat history
    Reset,

    /// Plain text that is not a command
    Text(String),

    /// A `/command` that is not recognized
    Unknown(String),
}

/// Parses one inbound message
///
/// # Examples
///
/// ```
/// use groqseeker::bot::{parse_bot_command, BotCommand};
/// use groqseeker::conversation::Topic;
///
/// assert_eq!(
///     parse_bot_command("/llama  what is   rust?"),
///     BotCommand::Chat { topic: Topic::Llama, text: "what is rust?".to_string() }
/// );
/// assert_eq!(parse_bot_command("/predict 1.35"), BotCommand::Predict(Some("1.35".to_string())));
/// assert_eq!(parse_bot_command("hello"), BotCommand::Text("hello".to_string()));
/// ```
pub fn parse_bot_command(input: &str) -> BotCommand {
    let trimmed = input.trim_start();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return BotCommand::Text(input.to_string());
    };

    let mut words = rest.split_whitespace();
    let head = words.next().unwrap_or_default();
    let name = head
        .split_once('@')
        .map(|(name, _bot)| name)
        .unwrap_or(head)
        .to_lowercase();
    let args: Vec<&str> = words.collect();

    match name.as_str() {
        "start" => BotCommand::Start,
        "help" => BotCommand::Help,
        "reset" => BotCommand::Reset,
        "predict" => BotCommand::Predict(args.first().map(|arg| arg.to_string())),
        other => match other.parse::<Topic>() {
            Ok(topic) => BotCommand::Chat {
                topic,
                text: args.join(" "),
            },
            Err(_) => BotCommand::Unknown(format!("/{}", name)),
        },
    }
}

/// Welcome text for `/start`
pub fn welcome_text() -> String {
    let mut text = String::from("Welcome to GroqSeeker_Bot!\n\n");
    for topic in Topic::ALL {
        text.push_str(&format!(
            "Use /{} <your question> to chat with {},\n",
            topic,
            topic.display_name()
        ));
    }
    text.push_str("Use /predict <usdsgd> to predict DBS share price,\n");
    text.push_str("Use /reset to clear your chat history.");
    text
}

/// Command list for `/help`
pub fn help_text() -> String {
    let mut text = String::from("Commands:\n");
    for topic in Topic::ALL {
        text.push_str(&format!(
            "/{} <question> - Chat with {} AI\n",
            topic,
            topic.display_name()
        ));
    }
    text.push_str("/predict <usdsgd> - Predict DBS share price\n");
    text.push_str("/predict - Show your last USD/SGD rate\n");
    text.push_str("/reset - Clear your chat history\n");
    text
}
