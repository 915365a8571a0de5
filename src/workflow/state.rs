use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{Story, TestCase};

/// Position in the fetch→generate pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Stage {
    #[default]
    Idle,
    StoryFetched,
    TestsGenerated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// Feedback line for the load chain or the publish action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl Status {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }
}

/// Feedback for the Zephyr Scale action, with the keys it created
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZephyrStatus {
    pub kind: StatusKind,
    pub message: String,
    pub created_keys: Vec<String>,
}

impl ZephyrStatus {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            message: message.into(),
            created_keys: Vec::new(),
        }
    }

    pub fn success(message: impl Into<String>, created_keys: Vec<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
            created_keys,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
            created_keys: Vec::new(),
        }
    }
}

/// The single record presenters render from.
///
/// Only the controller mutates it; everyone else works on clones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowState {
    pub stage: Stage,
    pub story: Option<Story>,
    pub test_cases: Vec<TestCase>,
    pub load_status: Option<Status>,
    pub zephyr_status: Option<ZephyrStatus>,
    pub publish_status: Option<Status>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Terminal actions only make sense once test cases exist
    pub fn accepts_actions(&self) -> bool {
        self.stage == Stage::TestsGenerated
    }

    /// Check the structural invariants between stage, story and test cases
    pub fn is_consistent(&self) -> bool {
        let story_matches_stage = match self.stage {
            Stage::Idle => self.story.is_none(),
            Stage::StoryFetched | Stage::TestsGenerated => self.story.is_some(),
        };
        let tests_match_stage = self.test_cases.is_empty() || self.stage == Stage::TestsGenerated;
        story_matches_stage && tests_match_stage
    }

    /// A new story id was submitted: drop everything derived from the
    /// previous story before the new chain starts.
    pub(crate) fn begin_load(&mut self, story_id: &str) {
        self.test_cases.clear();
        self.zephyr_status = None;
        self.publish_status = None;
        if self.stage == Stage::TestsGenerated {
            self.stage = Stage::StoryFetched;
        }
        self.load_status = Some(Status::info(format!("Loading story {story_id}...")));
        self.touch();
    }

    pub(crate) fn story_fetched(&mut self, story: Story) {
        self.story = Some(story);
        self.stage = Stage::StoryFetched;
        self.test_cases.clear();
        self.load_status = Some(Status::info("Generating test cases..."));
        self.touch();
    }

    pub(crate) fn tests_generated(&mut self, story: Story, test_cases: Vec<TestCase>) {
        let message = format!(
            "Generated {} test cases for {}",
            test_cases.len(),
            story.id
        );
        self.story = Some(story);
        self.test_cases = test_cases;
        self.stage = Stage::TestsGenerated;
        self.load_status = Some(Status::success(message));
        self.touch();
    }

    pub(crate) fn load_failed(&mut self, message: &str) {
        self.load_status = Some(Status::error(message));
        self.touch();
    }

    pub(crate) fn replace_test_cases(&mut self, test_cases: Vec<TestCase>) {
        self.test_cases = test_cases;
        self.touch();
    }

    pub(crate) fn set_zephyr_status(&mut self, status: ZephyrStatus) {
        self.zephyr_status = Some(status);
        self.touch();
    }

    pub(crate) fn set_publish_status(&mut self, status: Status) {
        self.publish_status = Some(status);
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(id: &str) -> Story {
        Story {
            id: id.to_string(),
            summary: "Login bug".to_string(),
            description: "Users cannot log in".to_string(),
        }
    }

    fn generated() -> WorkflowState {
        let mut state = WorkflowState::new();
        state.begin_load("PROJ-1");
        state.story_fetched(story("PROJ-1"));
        state.tests_generated(
            story("PROJ-1"),
            vec![
                TestCase::new("TC-1", "Valid login"),
                TestCase::new("TC-2", "Invalid password"),
            ],
        );
        state.set_zephyr_status(ZephyrStatus::success("Created 2 tests", vec!["ZS-1".into()]));
        state.set_publish_status(Status::success("Published"));
        state
    }

    #[test]
    fn new_state_is_idle_and_empty() {
        let state = WorkflowState::new();
        assert_eq!(state.stage, Stage::Idle);
        assert!(state.story.is_none());
        assert!(state.test_cases.is_empty());
        assert!(state.zephyr_status.is_none());
        assert!(state.publish_status.is_none());
        assert!(state.is_consistent());
        assert!(!state.accepts_actions());
    }

    #[test]
    fn begin_load_clears_everything_from_previous_story() {
        let mut state = generated();
        state.begin_load("PROJ-2");

        assert!(state.test_cases.is_empty());
        assert!(state.zephyr_status.is_none());
        assert!(state.publish_status.is_none());
        assert_eq!(state.stage, Stage::StoryFetched);
        assert_eq!(state.story.as_ref().map(|s| s.id.as_str()), Some("PROJ-1"));
        assert_eq!(
            state.load_status,
            Some(Status::info("Loading story PROJ-2..."))
        );
        assert!(state.is_consistent());
        assert!(!state.accepts_actions());
    }

    #[test]
    fn begin_load_keeps_idle_stage() {
        let mut state = WorkflowState::new();
        state.begin_load("PROJ-1");
        assert_eq!(state.stage, Stage::Idle);
        assert!(state.is_consistent());
    }

    #[test]
    fn generated_state_reports_count_and_accepts_actions() {
        let state = generated();
        assert_eq!(state.stage, Stage::TestsGenerated);
        assert!(state.accepts_actions());
        assert_eq!(
            state.load_status,
            Some(Status::success("Generated 2 test cases for PROJ-1"))
        );
        assert!(state.updated_at.is_some());
    }

    #[test]
    fn test_cases_outside_generated_stage_are_inconsistent() {
        let mut state = WorkflowState::new();
        state.story_fetched(story("PROJ-1"));
        state.test_cases.push(TestCase::new("TC-1", "Valid login"));
        assert!(!state.is_consistent());
    }
}
