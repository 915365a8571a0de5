use anyhow::Result;
use clap::Parser;

use story_testgen::cli::commands::config::ConfigCommand;
use story_testgen::cli::commands::run::RunCommand;
use story_testgen::cli::commands::session::SessionCommand;
use story_testgen::cli::commands::{show_how_to_start, Command};
use story_testgen::cli::{Cli, Commands};
use story_testgen::{init_telemetry, shutdown_telemetry, StoryTestgenConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    StoryTestgenConfig::load_env_file()?;
    let config = StoryTestgenConfig::load_from(cli.config.as_deref())?;
    init_telemetry(&config.observability)?;

    let result = match cli.command {
        None => show_how_to_start(),
        Some(Commands::Run {
            story_id,
            zephyr,
            project_id,
            publish,
            json,
        }) => {
            RunCommand {
                story_id,
                zephyr,
                project_id,
                publish,
                json,
                config,
            }
            .execute()
            .await
        }
        Some(Commands::Session) => SessionCommand::new(config).execute().await,
        Some(Commands::Config) => ConfigCommand::new(config).execute().await,
    };

    shutdown_telemetry();
    result
}
