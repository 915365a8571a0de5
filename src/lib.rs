// story-testgen library - story → test case workflow coordination
// This exposes the core components for testing and integration

pub mod backend;
pub mod cli;
pub mod config;
pub mod observability;
pub mod telemetry;
pub mod types;
pub mod workflow;

// Re-export key types for easy access
pub use backend::{BackendGateway, GatewayError, HttpGateway, PublishRequest, Published, ZephyrCreated, ZephyrRequest};
pub use config::{ChainPolicy, StoryTestgenConfig};
pub use observability::{gateway_metrics, GatewayMetrics};
pub use telemetry::{generate_correlation_id, init_telemetry, shutdown_telemetry};
pub use types::{ProjectId, Story, TestCase, DEFAULT_PROJECT_ID};
pub use workflow::{
    Action, ControllerSettings, Dispatch, Stage, Status, StatusKind, WorkflowController,
    WorkflowError, WorkflowState, ZephyrStatus,
};
