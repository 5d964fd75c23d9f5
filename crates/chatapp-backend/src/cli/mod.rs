/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
/// Chatapp Backend CLI
///
/// Serves the chat backend, or reads and posts messages against the configured
/// store from the command line.
pub struct Cli {
    /// Path to a configuration file layered over the built-in defaults
    #[arg(long, global = true, env = "CHATAPP_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat backend server
    Serve,

    /// Print a slice of the message log as the browser would receive it
    History {
        /// Index of the first message (negative counts from the end)
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        first: i64,
        /// Index of the last message (negative counts from the end)
        #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
        last: i64,
    },

    /// Store a message and broadcast it to connected clients
    Post {
        /// Message body
        #[arg(long)]
        content: String,
        /// Sender name
        #[arg(long)]
        name: Option<String>,
        /// Sender email
        #[arg(long)]
        email: Option<String>,
        /// Topic to post under
        #[arg(long)]
        topic: Option<String>,
    },
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
