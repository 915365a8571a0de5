pub mod client;
pub mod errors;
pub mod gateway;
pub mod types;

pub use client::HttpGateway;
pub use errors::GatewayError;
pub use gateway::BackendGateway;
#[cfg(any(test, feature = "testing"))]
pub use gateway::MockBackendGateway;
pub use types::{PublishRequest, Published, ZephyrCreated, ZephyrRequest};
