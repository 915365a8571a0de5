use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::ProjectId;

pub mod commands;
pub mod render;

#[derive(Parser)]
#[command(name = "story-testgen")]
#[command(about = "Generate test cases for an issue tracker story and push them downstream")]
#[command(long_about = "story-testgen fetches a story from the issue tracker, generates candidate \
                       test cases for it, and creates them in Zephyr Scale or publishes them back \
                       to the story. Get started with 'story-testgen run <STORY_ID>'.")]
pub struct Cli {
    /// Extra configuration file, applied over story-testgen.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a story, generate its test cases, and optionally push them
    Run {
        /// Issue tracker key of the story, e.g. PROJ-123
        story_id: String,
        /// Create the generated test cases in Zephyr Scale
        #[arg(long, help = "Create the generated test cases in Zephyr Scale")]
        zephyr: bool,
        /// Zephyr Scale project receiving the test cases
        #[arg(long, help = "Zephyr Scale project id (defaults to zephyr.default_project_id)")]
        project_id: Option<ProjectId>,
        /// Publish the generated test cases to the story
        #[arg(long, help = "Publish the generated test cases to the story")]
        publish: bool,
        /// Print the final workflow state as JSON
        #[arg(long, help = "Print the final workflow state as JSON instead of text")]
        json: bool,
    },
    /// Interactive session: load stories, edit test cases, push them
    Session,
    /// Print the effective configuration
    Config,
}
