use clap::Parser;
use llm_chat_client::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Chat(args) => cli::chat::run(args).await,
    }
}
