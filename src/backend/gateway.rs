use async_trait::async_trait;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use super::errors::GatewayError;
use super::types::{PublishRequest, Published, ZephyrCreated, ZephyrRequest};
use crate::types::{Story, TestCase};

/// The four remote operations the workflow depends on.
///
/// Implementations are plain request/response: no retries and no caching.
/// A `success: false` answer must come back as [`GatewayError::Rejected`] so
/// callers can tell it apart from a request that never completed.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Look up a story in the issue tracker
    async fn fetch_story(&self, story_id: &str) -> Result<Story, GatewayError>;

    /// Generate candidate test cases for a story
    async fn generate_tests(&self, story: &Story) -> Result<Vec<TestCase>, GatewayError>;

    /// Create the test cases as tickets in Zephyr Scale
    async fn create_zephyr_tests(
        &self,
        request: &ZephyrRequest,
    ) -> Result<ZephyrCreated, GatewayError>;

    /// Push the test cases to the publish sink
    async fn publish_tests(&self, request: &PublishRequest) -> Result<Published, GatewayError>;
}
