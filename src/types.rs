use serde::{Deserialize, Serialize};

/// Identifier of a Zephyr Scale project
pub type ProjectId = u64;

/// Project used when the operator does not name one
pub const DEFAULT_PROJECT_ID: ProjectId = 10000;

/// Requirement record pulled from the issue tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
}

/// Candidate test generated for a story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub description: String,
}

impl TestCase {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }
}
