//! Chat command - dispatches one conversation and prints events

use clap::Args;
use futures::StreamExt;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::Message;
use crate::infrastructure::logging;

#[derive(Args)]
pub struct ChatArgs {
    /// User message to send
    #[arg(short, long, default_value = "What's up")]
    pub message: String,

    /// Optional system prompt prepended to the conversation
    #[arg(short, long)]
    pub system: Option<String>,

    /// Wait for the full response instead of streaming
    #[arg(long)]
    pub no_stream: bool,
}

pub async fn run(args: ChatArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    logging::init_logging(&config.logging);

    let client = crate::create_client(&config)?;

    let mut messages = Vec::new();
    if let Some(system) = args.system {
        messages.push(Message::system(system));
    }
    messages.push(Message::user(args.message));

    info!(streaming = !args.no_stream, "dispatching chat completion");

    let mut events = client.chat_completion(messages, !args.no_stream);
    while let Some(event) = events.next().await {
        println!("{}", serde_json::to_string(&event)?);
    }
    println!("done");

    Ok(())
}
