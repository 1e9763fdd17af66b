use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use weatherbot_core::{Config, Dispatcher, InboundEvent, provider_from_config};

use crate::{logging::LogFormat, telegram};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherbot", version, about = "Telegram weather bot")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the bot and answer chat messages until interrupted.
    Run,

    /// Look up one location and print the reply the bot would send.
    Show {
        /// Location name.
        location: String,
    },

    /// Validate configuration and print it with secrets redacted.
    CheckConfig,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load(self.config.as_deref()).context("Failed to load configuration")?;

        match self.command {
            Command::Run => {
                config.validate().context("Refusing to start")?;
                let token = config.telegram_token()?;

                info!(
                    lang = %config.weather.language,
                    max_in_flight = config.dispatch.max_in_flight,
                    "configuration loaded"
                );

                telegram::run(token, dispatcher(&config)?).await;
            }
            Command::Show { location } => {
                let reply = dispatcher(&config)?
                    .handle(InboundEvent::Text(location))
                    .await;
                println!("{reply}");
            }
            Command::CheckConfig => {
                config.validate()?;
                println!("{config:#?}");
            }
        }

        Ok(())
    }
}

fn dispatcher(config: &Config) -> anyhow::Result<Dispatcher> {
    let provider = provider_from_config(config).context("Failed to set up weather provider")?;

    Ok(Dispatcher::new(provider, config.dispatch.max_in_flight, config.weather.clock))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_show_with_global_flags() {
        let cli = Cli::try_parse_from([
            "weatherbot",
            "show",
            "Львів",
            "--config",
            "/tmp/weatherbot.toml",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::Show { ref location } if location == "Львів"));
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/weatherbot.toml")));
        assert!(matches!(cli.log_format, LogFormat::Json));
    }

    #[test]
    fn run_takes_no_arguments() {
        assert!(Cli::try_parse_from(["weatherbot", "run", "extra"]).is_err());
    }
}
