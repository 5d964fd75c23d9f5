/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Chatapp Backend CLI application
//!
//! Entry point for serving the chat backend and for the `history` and `post`
//! maintenance commands.

use chatapp_backend::cli::{self, commands, Commands};
use chatapp_utils::config::Settings;
use chatapp_utils::{logging, telemetry};
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let cli = cli::parse_cli();

    // Load configuration
    let config = Settings::new(cli.config.clone())?;

    match cli.command {
        Commands::Serve => {
            telemetry::init(&config.telemetry, &config.log.level, &config.log.format)?;
            let result = commands::serve(&config).await;
            telemetry::shutdown();
            result?;
        }
        Commands::History { first, last } => {
            logging::init_with_format(&config.log.level, &config.log.format)?;
            let payload = commands::history(&config, first, last).await?;
            println!("{}", payload);
        }
        Commands::Post {
            content,
            name,
            email,
            topic,
        } => {
            logging::init_with_format(&config.log.level, &config.log.format)?;
            let id = commands::post(&config, content, name, email, topic).await?;
            println!("{}", id);
        }
    }
    Ok(())
}
