// Story → test case workflow coordination

pub mod controller;
pub mod errors;
pub mod state;

pub use controller::{ControllerSettings, Dispatch, WorkflowController};
pub use errors::{Action, WorkflowError};
pub use state::{Stage, Status, StatusKind, WorkflowState, ZephyrStatus};
