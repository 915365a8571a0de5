use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::backend::GatewayError;

/// The four backend-facing steps of the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    FetchStory,
    GenerateTests,
    CreateZephyrTests,
    PublishTests,
}

impl Action {
    /// Shown while the call is outstanding
    pub fn in_flight_message(self) -> &'static str {
        match self {
            Action::FetchStory => "Loading story...",
            Action::GenerateTests => "Generating test cases...",
            Action::CreateZephyrTests => "Creating test cases in Zephyr Scale...",
            Action::PublishTests => "Publishing test cases...",
        }
    }

    /// Shown when the backend reports failure without saying why
    pub fn fallback_message(self) -> &'static str {
        match self {
            Action::FetchStory => "Failed to fetch story",
            Action::GenerateTests => "Failed to generate test cases",
            Action::CreateZephyrTests => "Failed to create test cases in Zephyr Scale",
            Action::PublishTests => "Failed to publish test cases",
        }
    }

    /// Shown when the request could not complete
    pub fn connectivity_message(self) -> &'static str {
        match self {
            Action::FetchStory => "Error connecting to the story service",
            Action::GenerateTests => "Error connecting to the test generation service",
            Action::CreateZephyrTests => "Error connecting to Zephyr Scale",
            Action::PublishTests => "Error connecting to the publish service",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::FetchStory => "fetch story",
            Action::GenerateTests => "generate tests",
            Action::CreateZephyrTests => "create Zephyr tests",
            Action::PublishTests => "publish tests",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the workflow controller.
///
/// Only `Validation` is ever returned to a caller; the other two are turned
/// into status messages on the workflow state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Application { action: Action, message: String },

    #[error("{message}")]
    Network { action: Action, message: String },
}

impl WorkflowError {
    pub fn validation(message: impl Into<String>) -> Self {
        WorkflowError::Validation {
            message: message.into(),
        }
    }

    /// Classify a gateway failure for `action` and pick the message to show
    pub fn from_gateway(action: Action, err: &GatewayError) -> Self {
        warn!(%action, error = %err, "Backend call failed");

        if err.is_network() {
            return WorkflowError::Network {
                action,
                message: action.connectivity_message().to_string(),
            };
        }

        let message = err
            .collaborator_message()
            .unwrap_or_else(|| action.fallback_message())
            .to_string();
        WorkflowError::Application { action, message }
    }

    pub fn message(&self) -> &str {
        match self {
            WorkflowError::Validation { message }
            | WorkflowError::Application { message, .. }
            | WorkflowError::Network { message, .. } => message,
        }
    }
}
