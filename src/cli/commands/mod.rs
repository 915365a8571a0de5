use anyhow::{Context, Result};
use std::sync::Arc;

use crate::backend::HttpGateway;
use crate::config::StoryTestgenConfig;
use crate::workflow::{ControllerSettings, WorkflowController};

pub mod config;
pub mod run;
pub mod session;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Wire the HTTP gateway and the controller from configuration
pub fn build_controller(config: &StoryTestgenConfig) -> Result<Arc<WorkflowController>> {
    let gateway = HttpGateway::new(&config.backend)
        .context("Failed to build the backend HTTP client")?;
    tracing::debug!(base_url = gateway.base_url(), "Backend gateway ready");

    Ok(Arc::new(WorkflowController::new(
        Arc::new(gateway),
        ControllerSettings::from(config),
    )))
}

pub fn show_how_to_start() -> Result<()> {
    println!("🧪 story-testgen - test cases for issue tracker stories");
    println!();
    println!("To get started:");
    println!("  🚀 story-testgen run PROJ-123             # Load a story and generate test cases");
    println!("  📤 story-testgen run PROJ-123 --zephyr    # ...and create them in Zephyr Scale");
    println!("  📎 story-testgen run PROJ-123 --publish   # ...and publish them to the story");
    println!("  💬 story-testgen session                  # Interactive session");
    println!("  ⚙️  story-testgen config                   # Show effective configuration");
    Ok(())
}
