//! Scripted backend for driving the workflow controller from integration tests.
//!
//! Every call parks on a oneshot channel the test holds the sender of, so the
//! test decides when, and in which order, each response arrives.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::oneshot;

use story_testgen::{
    BackendGateway, GatewayError, PublishRequest, Published, Story, TestCase, ZephyrCreated,
    ZephyrRequest,
};

pub type Reply<T> = Result<T, GatewayError>;

#[derive(Default)]
pub struct ScriptedGateway {
    fetches: Mutex<HashMap<String, oneshot::Receiver<Reply<Story>>>>,
    generations: Mutex<HashMap<String, oneshot::Receiver<Reply<Vec<TestCase>>>>>,
    zephyr: Mutex<VecDeque<oneshot::Receiver<Reply<ZephyrCreated>>>>,
    publishes: Mutex<VecDeque<oneshot::Receiver<Reply<Published>>>>,
    calls: Mutex<Vec<String>>,
    zephyr_requests: Mutex<Vec<ZephyrRequest>>,
    publish_requests: Mutex<Vec<PublishRequest>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Response for the next fetch of `story_id`
    pub fn script_fetch(&self, story_id: &str) -> oneshot::Sender<Reply<Story>> {
        let (tx, rx) = oneshot::channel();
        self.fetches.lock().unwrap().insert(story_id.to_string(), rx);
        tx
    }

    /// Response for the next generation run for `story_id`
    pub fn script_generate(&self, story_id: &str) -> oneshot::Sender<Reply<Vec<TestCase>>> {
        let (tx, rx) = oneshot::channel();
        self.generations
            .lock()
            .unwrap()
            .insert(story_id.to_string(), rx);
        tx
    }

    /// Response for the next Zephyr Scale call, in call order
    pub fn script_zephyr(&self) -> oneshot::Sender<Reply<ZephyrCreated>> {
        let (tx, rx) = oneshot::channel();
        self.zephyr.lock().unwrap().push_back(rx);
        tx
    }

    /// Response for the next publish call, in call order
    pub fn script_publish(&self) -> oneshot::Sender<Reply<Published>> {
        let (tx, rx) = oneshot::channel();
        self.publishes.lock().unwrap().push_back(rx);
        tx
    }

    /// Calls received so far, as `fetch:ID`, `generate:ID`, `zephyr:ID`, `publish:ID`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn zephyr_requests(&self) -> Vec<ZephyrRequest> {
        self.zephyr_requests.lock().unwrap().clone()
    }

    pub fn publish_requests(&self) -> Vec<PublishRequest> {
        self.publish_requests.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

async fn await_reply<T>(endpoint: &str, scripted: Option<oneshot::Receiver<Reply<T>>>) -> Reply<T> {
    let Some(receiver) = scripted else {
        panic!("unscripted call to {endpoint}");
    };
    receiver.await.unwrap_or_else(|_| Err(transport_error(endpoint)))
}

#[async_trait]
impl BackendGateway for ScriptedGateway {
    async fn fetch_story(&self, story_id: &str) -> Result<Story, GatewayError> {
        self.record(format!("fetch:{story_id}"));
        let scripted = self.fetches.lock().unwrap().remove(story_id);
        await_reply("/fetch_story", scripted).await
    }

    async fn generate_tests(&self, story: &Story) -> Result<Vec<TestCase>, GatewayError> {
        self.record(format!("generate:{}", story.id));
        let scripted = self.generations.lock().unwrap().remove(&story.id);
        await_reply("/generate_tests", scripted).await
    }

    async fn create_zephyr_tests(
        &self,
        request: &ZephyrRequest,
    ) -> Result<ZephyrCreated, GatewayError> {
        self.record(format!("zephyr:{}", request.story_key));
        self.zephyr_requests.lock().unwrap().push(request.clone());
        let scripted = self.zephyr.lock().unwrap().pop_front();
        await_reply("/create_zephyr_tests_ui", scripted).await
    }

    async fn publish_tests(&self, request: &PublishRequest) -> Result<Published, GatewayError> {
        self.record(format!("publish:{}", request.story_id));
        self.publish_requests.lock().unwrap().push(request.clone());
        let scripted = self.publishes.lock().unwrap().pop_front();
        await_reply("/publish_tests", scripted).await
    }
}

pub fn story(id: &str) -> Story {
    Story {
        id: id.to_string(),
        summary: format!("Summary of {id}"),
        description: format!("Description of {id}"),
    }
}

/// Two test cases whose ids carry `story_id`, so results are traceable
pub fn cases_for(story_id: &str) -> Vec<TestCase> {
    vec![
        TestCase::new(format!("{story_id}-TC-1"), "Happy path"),
        TestCase::new(format!("{story_id}-TC-2"), "Invalid input is rejected"),
    ]
}

pub fn transport_error(endpoint: &str) -> GatewayError {
    GatewayError::Transport {
        endpoint: endpoint.to_string(),
        message: "connection refused".to_string(),
    }
}

pub fn rejected(endpoint: &str, message: &str) -> GatewayError {
    GatewayError::Rejected {
        endpoint: endpoint.to_string(),
        message: Some(message.to_string()),
    }
}

/// Yield to spawned tasks until `condition` holds
pub async fn until(mut condition: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
