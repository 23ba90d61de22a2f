//! CLI module for the chat client
//!
//! Provides the `chat` subcommand, which dispatches one conversation and
//! prints each event to stdout.

pub mod chat;

use clap::{Parser, Subcommand};

/// Streaming chat completion client for OpenAI-compatible endpoints
#[derive(Parser)]
#[command(name = "llm-chat-client")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Send a chat completion request and print each event
    Chat(chat::ChatArgs),
}
