// Wire shapes of the four backend endpoints

use serde::{Deserialize, Serialize};

use crate::types::{ProjectId, Story, TestCase};

#[derive(Debug, Serialize)]
pub(crate) struct FetchStoryRequest<'a> {
    pub story_id: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateTestsRequest<'a> {
    pub story: &'a Story,
}

/// Body of the Zephyr Scale creation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZephyrRequest {
    pub story_key: String,
    pub test_cases: Vec<TestCase>,
    pub project_id: ProjectId,
}

/// Body of the publish call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishRequest {
    pub story_id: String,
    pub test_cases: Vec<TestCase>,
}

/// Common `{success, message?, error?}` header of every response
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StoryPayload {
    pub story: Story,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TestCasesPayload {
    pub test_cases: Vec<TestCase>,
}

/// Result of a successful Zephyr Scale creation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ZephyrCreated {
    pub message: String,
    #[serde(default)]
    pub created_keys: Vec<String>,
}

/// Result of a successful publish
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Published {
    pub message: String,
}
