use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio::task::JoinSet;

use super::{build_controller, Command};
use crate::cli::render::{render_state, render_test_cases, status_lines};
use crate::config::StoryTestgenConfig;
use crate::types::{ProjectId, TestCase};
use crate::workflow::{Dispatch, Stage, WorkflowController, WorkflowState};

const HELP: &str = "\
Commands:
  load <story-id>          Fetch a story and generate test cases
  show                     Show the story, test cases and statuses
  edit <n> <description>   Change the description of test case n
  zephyr [project-id]      Create the test cases in Zephyr Scale
  publish                  Publish the test cases to the story
  help                     Show this help
  quit                     Leave the session";

/// One parsed line of session input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Load(String),
    Show,
    Edit { index: usize, description: String },
    Zephyr(Option<ProjectId>),
    Publish,
    Help,
    Quit,
}

impl SessionInput {
    /// `Ok(None)` for a blank line
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let input = match verb.to_ascii_lowercase().as_str() {
            "load" | "fetch" => SessionInput::Load(rest.to_string()),
            "show" => SessionInput::Show,
            "edit" => {
                let (index, description) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| "Usage: edit <n> <description>".to_string())?;
                let index = index
                    .parse::<usize>()
                    .map_err(|_| format!("'{index}' is not a test case number"))?;
                SessionInput::Edit {
                    index,
                    description: description.trim().to_string(),
                }
            }
            "zephyr" => {
                if rest.is_empty() {
                    SessionInput::Zephyr(None)
                } else {
                    let project_id = rest
                        .parse::<ProjectId>()
                        .map_err(|_| format!("'{rest}' is not a project id"))?;
                    SessionInput::Zephyr(Some(project_id))
                }
            }
            "publish" => SessionInput::Publish,
            "help" | "?" => SessionInput::Help,
            "quit" | "exit" => SessionInput::Quit,
            other => return Err(format!("Unknown command '{other}', try 'help'")),
        };
        Ok(Some(input))
    }
}

pub enum Flow {
    Continue(Option<String>),
    Quit,
}

/// Interactive front end over a shared controller.
///
/// Edits live in a local draft and are reconciled into the controller right
/// before a terminal action; the controller's state is never touched
/// directly.
pub struct Session {
    controller: Arc<WorkflowController>,
    draft: Option<Vec<TestCase>>,
    tasks: JoinSet<()>,
}

impl Session {
    pub fn new(controller: Arc<WorkflowController>) -> Self {
        Self {
            controller,
            draft: None,
            tasks: JoinSet::new(),
        }
    }

    /// Current state with the local draft laid over the test cases
    pub fn view(&self) -> WorkflowState {
        let mut state = self.controller.snapshot();
        if let Some(draft) = &self.draft {
            state.test_cases = draft.clone();
        }
        state
    }

    pub fn handle(&mut self, input: SessionInput) -> Flow {
        match input {
            SessionInput::Load(story_id) => {
                self.draft = None;
                let controller = Arc::clone(&self.controller);
                self.tasks.spawn(async move {
                    if let Err(err) = controller.submit_story_id(&story_id).await {
                        println!("⚠️  {err}");
                    }
                });
                Flow::Continue(None)
            }
            SessionInput::Show => Flow::Continue(Some(render_state(&self.view()))),
            SessionInput::Edit { index, description } => Flow::Continue(Some(self.edit(index, description))),
            SessionInput::Zephyr(project_id) => {
                if let Some(message) = self.reconcile() {
                    return Flow::Continue(Some(message));
                }
                let controller = Arc::clone(&self.controller);
                let project_id = project_id.unwrap_or_else(|| controller.default_project_id());
                self.tasks.spawn(async move {
                    let dispatch = controller.request_zephyr_creation(project_id).await;
                    report_skipped(dispatch);
                });
                Flow::Continue(None)
            }
            SessionInput::Publish => {
                if let Some(message) = self.reconcile() {
                    return Flow::Continue(Some(message));
                }
                let controller = Arc::clone(&self.controller);
                self.tasks.spawn(async move {
                    let dispatch = controller.request_publish().await;
                    report_skipped(dispatch);
                });
                Flow::Continue(None)
            }
            SessionInput::Help => Flow::Continue(Some(HELP.to_string())),
            SessionInput::Quit => Flow::Quit,
        }
    }

    fn edit(&mut self, index: usize, description: String) -> String {
        let state = self.controller.snapshot();
        if state.stage != Stage::TestsGenerated {
            return "⚠️  No test cases to edit yet, load a story first".to_string();
        }
        if description.is_empty() {
            return "⚠️  Description cannot be empty".to_string();
        }

        let draft = self.draft.get_or_insert_with(|| state.test_cases.clone());
        match index.checked_sub(1).and_then(|i| draft.get_mut(i)) {
            Some(case) => {
                case.description = description;
                format!("✏️  Updated {} (applied before the next zephyr/publish)", case.id)
            }
            None => format!("⚠️  There is no test case {index}, pick 1-{}", draft.len()),
        }
    }

    /// Push the local draft into the controller. Returns a message when the
    /// draft was refused.
    fn reconcile(&mut self) -> Option<String> {
        let draft = self.draft.take()?;
        match self.controller.apply_edits(draft) {
            Ok(_) => None,
            Err(err) => Some(format!("⚠️  {err}")),
        }
    }

    /// Wait for every spawned operation to finish
    pub async fn settle(&mut self) {
        while self.tasks.join_next().await.is_some() {}
    }
}

fn report_skipped(dispatch: Dispatch) {
    if dispatch == Dispatch::Skipped {
        println!("⚠️  Generate test cases first: load <story-id>");
    }
}

/// Print status changes and freshly generated test cases as they happen
async fn watch_state(mut receiver: watch::Receiver<WorkflowState>) {
    let (mut last_lines, mut last_stage) = {
        let state = receiver.borrow_and_update();
        (status_lines(&state), state.stage)
    };

    while receiver.changed().await.is_ok() {
        let state = receiver.borrow_and_update().clone();
        if state.stage == Stage::TestsGenerated && last_stage != Stage::TestsGenerated {
            print!("{}", render_test_cases(&state));
        }
        let lines = status_lines(&state);
        for line in lines.iter().filter(|line| !last_lines.contains(line)) {
            println!("{line}");
        }
        last_lines = lines;
        last_stage = state.stage;
    }
}

pub struct SessionCommand {
    config: StoryTestgenConfig,
}

impl SessionCommand {
    pub fn new(config: StoryTestgenConfig) -> Self {
        Self { config }
    }
}

impl Command for SessionCommand {
    async fn execute(&self) -> Result<()> {
        let controller = build_controller(&self.config)?;
        let watcher = tokio::spawn(watch_state(controller.subscribe()));
        let mut session = Session::new(controller);

        println!("💬 story-testgen session ({})", self.config.backend.base_url);
        println!("{HELP}");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            match SessionInput::parse(&line) {
                Ok(None) => {}
                Ok(Some(input)) => match session.handle(input) {
                    Flow::Continue(Some(output)) => println!("{output}"),
                    Flow::Continue(None) => {}
                    Flow::Quit => break,
                },
                Err(message) => println!("⚠️  {message}"),
            }
        }

        watcher.abort();
        Ok(())
    }
}
