use anyhow::Result;

use super::Command;
use crate::config::StoryTestgenConfig;

pub struct ConfigCommand {
    config: StoryTestgenConfig,
}

impl ConfigCommand {
    pub fn new(config: StoryTestgenConfig) -> Self {
        Self { config }
    }
}

impl Command for ConfigCommand {
    async fn execute(&self) -> Result<()> {
        print!("{}", toml::to_string_pretty(&self.config)?);
        Ok(())
    }
}
