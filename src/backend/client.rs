use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::errors::GatewayError;
use super::gateway::BackendGateway;
use super::types::{
    Envelope, FetchStoryRequest, GenerateTestsRequest, PublishRequest, Published, StoryPayload,
    TestCasesPayload, ZephyrCreated, ZephyrRequest,
};
use crate::config::{BackendConfig, EndpointConfig};
use crate::observability::{gateway_metrics, OperationTimer};
use crate::telemetry::generate_correlation_id;
use crate::types::{Story, TestCase};

/// JSON-over-HTTP implementation of [`BackendGateway`]
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    endpoints: EndpointConfig,
}

impl HttpGateway {
    pub fn new(config: &BackendConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(seconds) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            endpoints: config.endpoints.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post<B, T>(&self, operation: &'static str, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let metrics = gateway_metrics();
        let timer = OperationTimer::new(operation);
        let correlation_id = generate_correlation_id();
        metrics.record_request();

        let transport = |err: reqwest::Error| GatewayError::Transport {
            endpoint: path.to_string(),
            message: err.to_string(),
        };

        let sent = self
            .client
            .post(self.url(path))
            .header("x-correlation-id", &correlation_id)
            .json(body)
            .send()
            .await;
        let response = match sent {
            Ok(response) => response,
            Err(err) => {
                metrics.record_transport_error();
                warn!(operation, endpoint = path, %correlation_id, error = %err, "Backend unreachable");
                return Err(transport(err));
            }
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                metrics.record_transport_error();
                return Err(transport(err));
            }
        };

        let outcome = decode_response(path, status, &bytes);
        if let Err(GatewayError::Rejected { .. }) = &outcome {
            metrics.record_rejection();
        }

        debug!(
            operation = timer.operation(),
            endpoint = path,
            %correlation_id,
            status = status.as_u16(),
            success = outcome.is_ok(),
            duration_ms = timer.elapsed().as_millis() as u64,
            "Backend request finished"
        );
        outcome
    }
}

/// Decode a backend response body.
///
/// The body is read as a `{success, ...}` envelope whatever the HTTP status,
/// since the backend reports failures as JSON with 404/500 statuses.
pub(crate) fn decode_response<T: DeserializeOwned>(
    endpoint: &str,
    status: StatusCode,
    body: &[u8],
) -> Result<T, GatewayError> {
    let unreadable = |detail: String| {
        if status.is_success() {
            GatewayError::Decode {
                endpoint: endpoint.to_string(),
                detail,
            }
        } else {
            GatewayError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            }
        }
    };

    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|err| unreadable(err.to_string()))?;
    let envelope: Envelope =
        serde_json::from_value(value.clone()).map_err(|err| unreadable(err.to_string()))?;

    if !envelope.success {
        return Err(GatewayError::Rejected {
            endpoint: endpoint.to_string(),
            message: envelope.message.or(envelope.error),
        });
    }

    serde_json::from_value(value).map_err(|err| GatewayError::Decode {
        endpoint: endpoint.to_string(),
        detail: err.to_string(),
    })
}

#[async_trait]
impl BackendGateway for HttpGateway {
    async fn fetch_story(&self, story_id: &str) -> Result<Story, GatewayError> {
        let payload: StoryPayload = self
            .post(
                "fetch_story",
                &self.endpoints.fetch_story,
                &FetchStoryRequest { story_id },
            )
            .await?;
        Ok(payload.story)
    }

    async fn generate_tests(&self, story: &Story) -> Result<Vec<TestCase>, GatewayError> {
        let payload: TestCasesPayload = self
            .post(
                "generate_tests",
                &self.endpoints.generate_tests,
                &GenerateTestsRequest { story },
            )
            .await?;
        Ok(payload.test_cases)
    }

    async fn create_zephyr_tests(
        &self,
        request: &ZephyrRequest,
    ) -> Result<ZephyrCreated, GatewayError> {
        self.post(
            "create_zephyr_tests",
            &self.endpoints.create_zephyr_tests,
            request,
        )
        .await
    }

    async fn publish_tests(&self, request: &PublishRequest) -> Result<Published, GatewayError> {
        self.post("publish_tests", &self.endpoints.publish_tests, request)
            .await
    }
}
