//! Binary crate for the `weatherbot` Telegram bot.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Loading and validating configuration
//! - Wiring the dispatcher to Telegram

use clap::Parser;

mod cli;
mod logging;
mod telegram;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; variables may come from the real environment.
    let _ = dotenvy::dotenv();

    let cmd = cli::Cli::parse();
    logging::init(cmd.log_format)?;
    cmd.run().await
}
