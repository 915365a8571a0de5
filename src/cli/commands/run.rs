use anyhow::{bail, Result};

use super::{build_controller, Command};
use crate::cli::render::render_state;
use crate::config::StoryTestgenConfig;
use crate::types::ProjectId;
use crate::workflow::Dispatch;

/// One-shot load → generate → push
pub struct RunCommand {
    pub story_id: String,
    pub zephyr: bool,
    pub project_id: Option<ProjectId>,
    pub publish: bool,
    pub json: bool,
    pub config: StoryTestgenConfig,
}

impl Command for RunCommand {
    async fn execute(&self) -> Result<()> {
        let controller = build_controller(&self.config)?;

        if !self.json && !self.story_id.trim().is_empty() {
            println!("🔄 Loading story {}...", self.story_id.trim());
        }
        let loaded = controller.submit_story_id(&self.story_id).await?;

        if loaded != Dispatch::Completed {
            let state = controller.snapshot();
            if self.json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                print!("{}", render_state(&state));
            }
            bail!("Story {} could not be loaded", self.story_id.trim());
        }

        let project_id = self
            .project_id
            .unwrap_or_else(|| controller.default_project_id());

        // The two actions write disjoint status fields, so they run side by side
        let (zephyr, publish) = tokio::join!(
            async {
                if self.zephyr {
                    Some(controller.request_zephyr_creation(project_id).await)
                } else {
                    None
                }
            },
            async {
                if self.publish {
                    Some(controller.request_publish().await)
                } else {
                    None
                }
            }
        );

        let state = controller.snapshot();
        if self.json {
            println!("{}", serde_json::to_string_pretty(&state)?);
        } else {
            println!();
            print!("{}", render_state(&state));
        }

        let failed = [zephyr, publish]
            .into_iter()
            .flatten()
            .any(|dispatch| dispatch == Dispatch::Failed);
        if failed {
            bail!("Some test case uploads failed");
        }
        Ok(())
    }
}
