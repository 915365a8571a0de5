use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, Instrument};

use super::errors::{Action, WorkflowError};
use super::state::{Status, WorkflowState, ZephyrStatus};
use crate::backend::{BackendGateway, PublishRequest, ZephyrRequest};
use crate::config::{ChainPolicy, StoryTestgenConfig};
use crate::telemetry::{create_workflow_span, generate_correlation_id};
use crate::types::{ProjectId, Story, TestCase, DEFAULT_PROJECT_ID};

/// What a controller operation did, from the coordinator's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Every backend call succeeded and the state reflects it
    Completed,
    /// A backend call failed; the failure is on the matching status field
    Failed,
    /// Preconditions did not hold, nothing was sent
    Skipped,
    /// A newer story submission took over before this one finished
    Superseded,
}

/// Construction-time settings of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    pub default_project_id: ProjectId,
    pub chain_policy: ChainPolicy,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            default_project_id: DEFAULT_PROJECT_ID,
            chain_policy: ChainPolicy::default(),
        }
    }
}

impl From<&StoryTestgenConfig> for ControllerSettings {
    fn from(config: &StoryTestgenConfig) -> Self {
        Self {
            default_project_id: config.zephyr.default_project_id,
            chain_policy: config.workflow.chain_policy,
        }
    }
}

/// Test cases and story captured when a terminal action starts
struct ActionSnapshot {
    story: Story,
    test_cases: Vec<TestCase>,
    generation: u64,
}

/// Sequences the backend calls and owns the workflow state.
///
/// Operations take `&self` so presenters can run them concurrently from an
/// `Arc`. State is published through a watch channel; gateway failures never
/// escape as errors, they land on the status fields.
pub struct WorkflowController {
    gateway: Arc<dyn BackendGateway>,
    settings: ControllerSettings,
    state: watch::Sender<WorkflowState>,
    chain: Mutex<CancellationToken>,
    // Bumped under the state lock on every story submission; action results
    // captured under an older generation must not land on the new story.
    generation: AtomicU64,
}

impl WorkflowController {
    pub fn new(gateway: Arc<dyn BackendGateway>, settings: ControllerSettings) -> Self {
        let (state, _) = watch::channel(WorkflowState::new());
        Self {
            gateway,
            settings,
            state,
            chain: Mutex::new(CancellationToken::new()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> ControllerSettings {
        self.settings
    }

    pub fn default_project_id(&self) -> ProjectId {
        self.settings.default_project_id
    }

    /// Clone of the current state
    pub fn snapshot(&self) -> WorkflowState {
        self.state.borrow().clone()
    }

    /// Receiver notified after every state change
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state.subscribe()
    }

    /// Load a story and generate its test cases as one operation.
    ///
    /// Returns `Err` only for an empty id, in which case nothing is sent and
    /// the state is untouched.
    pub async fn submit_story_id(&self, raw_id: &str) -> Result<Dispatch, WorkflowError> {
        let story_id = raw_id.trim();
        if story_id.is_empty() {
            return Err(WorkflowError::validation("Please enter a story ID"));
        }

        let correlation_id = generate_correlation_id();
        let span = create_workflow_span("load_story", Some(story_id), &correlation_id);
        let dispatch = self
            .run_chain(story_id.to_string())
            .instrument(span)
            .await;
        Ok(dispatch)
    }

    async fn run_chain(&self, story_id: String) -> Dispatch {
        let token = self.begin_chain(&story_id);

        let fetched = match self.guarded(&token, self.gateway.fetch_story(&story_id)).await {
            Some(result) => result,
            None => return self.superseded(),
        };
        let story = match fetched {
            Ok(story) => story,
            Err(err) => {
                let failure = WorkflowError::from_gateway(Action::FetchStory, &err);
                return self.write_chain(&token, Dispatch::Failed, |state| {
                    state.load_failed(failure.message())
                });
            }
        };

        info!(summary = %story.summary, "Story fetched, generating test cases");
        let written = self.write_chain(&token, Dispatch::Completed, |state| {
            state.story_fetched(story.clone())
        });
        if written == Dispatch::Superseded {
            return written;
        }

        let generated = match self.guarded(&token, self.gateway.generate_tests(&story)).await {
            Some(result) => result,
            None => return self.superseded(),
        };
        match generated {
            Ok(test_cases) if !test_cases.is_empty() => {
                info!(count = test_cases.len(), "Test cases generated");
                self.write_chain(&token, Dispatch::Completed, |state| {
                    state.tests_generated(story, test_cases)
                })
            }
            Ok(_) => {
                info!("Generation returned no test cases");
                self.write_chain(&token, Dispatch::Failed, |state| {
                    state.load_failed(Action::GenerateTests.fallback_message())
                })
            }
            Err(err) => {
                let failure = WorkflowError::from_gateway(Action::GenerateTests, &err);
                self.write_chain(&token, Dispatch::Failed, |state| {
                    state.load_failed(failure.message())
                })
            }
        }
    }

    /// Start a new chain: cancel the previous one when superseding, and
    /// reset everything derived from the previous story.
    fn begin_chain(&self, story_id: &str) -> CancellationToken {
        let token = match self.settings.chain_policy {
            ChainPolicy::Supersede => {
                let mut current = self.chain.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                current.cancel();
                *current = CancellationToken::new();
                current.clone()
            }
            ChainPolicy::LastResolutionWins => CancellationToken::new(),
        };

        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            state.begin_load(story_id)
        });
        token
    }

    /// Await a gateway call unless the chain gets cancelled first
    async fn guarded<T>(&self, token: &CancellationToken, call: impl Future<Output = T>) -> Option<T> {
        tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = call => Some(result),
        }
    }

    /// Apply a chain update unless the chain was cancelled. The check runs
    /// under the state lock so a newer chain's reset can't be overwritten.
    fn write_chain(
        &self,
        token: &CancellationToken,
        outcome: Dispatch,
        update: impl FnOnce(&mut WorkflowState),
    ) -> Dispatch {
        let applied = self.state.send_if_modified(|state| {
            if token.is_cancelled() {
                return false;
            }
            update(state);
            debug_assert!(state.is_consistent());
            true
        });

        if applied {
            outcome
        } else {
            self.superseded()
        }
    }

    fn superseded(&self) -> Dispatch {
        debug!("Chain superseded by a newer story submission");
        Dispatch::Superseded
    }

    /// Replace the canonical test cases with a presenter-edited copy.
    ///
    /// Only meaningful once tests were generated; the list is replaced whole.
    pub fn apply_edits(&self, test_cases: Vec<TestCase>) -> Result<Dispatch, WorkflowError> {
        if test_cases.is_empty() {
            return Err(WorkflowError::validation("At least one test case is required"));
        }
        if test_cases.iter().any(|case| case.id.trim().is_empty()) {
            return Err(WorkflowError::validation("Every test case needs an ID"));
        }

        let mut outcome = Dispatch::Skipped;
        self.state.send_if_modified(|state| {
            if !state.accepts_actions() {
                return false;
            }
            outcome = Dispatch::Completed;
            if state.test_cases == test_cases {
                return false;
            }
            state.replace_test_cases(test_cases);
            true
        });
        Ok(outcome)
    }

    fn action_snapshot(&self) -> Option<ActionSnapshot> {
        let state = self.state.borrow();
        if !state.accepts_actions() {
            return None;
        }
        Some(ActionSnapshot {
            story: state.story.clone()?,
            test_cases: state.test_cases.clone(),
            generation: self.generation.load(Ordering::SeqCst),
        })
    }

    /// Write an action result unless a new story was submitted meanwhile
    fn write_action(
        &self,
        generation: u64,
        outcome: Dispatch,
        update: impl FnOnce(&mut WorkflowState),
    ) -> Dispatch {
        let applied = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            update(state);
            true
        });

        if applied {
            outcome
        } else {
            debug!("Discarding action result for a previous story");
            Dispatch::Superseded
        }
    }

    /// Create the current test cases as Zephyr Scale tickets.
    ///
    /// A no-op returning [`Dispatch::Skipped`] unless tests were generated.
    pub async fn request_zephyr_creation(&self, project_id: ProjectId) -> Dispatch {
        let Some(snapshot) = self.action_snapshot() else {
            debug!("Zephyr creation requested before test cases exist");
            return Dispatch::Skipped;
        };

        let correlation_id = generate_correlation_id();
        let span = create_workflow_span(
            "create_zephyr_tests",
            Some(&snapshot.story.id),
            &correlation_id,
        );

        async move {
            let started = self.write_action(snapshot.generation, Dispatch::Completed, |state| {
                state.set_zephyr_status(ZephyrStatus::info(
                    Action::CreateZephyrTests.in_flight_message(),
                ))
            });
            if started == Dispatch::Superseded {
                return started;
            }

            let request = ZephyrRequest {
                story_key: snapshot.story.id.clone(),
                test_cases: snapshot.test_cases,
                project_id,
            };
            info!(project_id, count = request.test_cases.len(), "Creating Zephyr test cases");

            match self.gateway.create_zephyr_tests(&request).await {
                Ok(created) => {
                    info!(created = created.created_keys.len(), "Zephyr test cases created");
                    self.write_action(snapshot.generation, Dispatch::Completed, |state| {
                        state.set_zephyr_status(ZephyrStatus::success(
                            created.message,
                            created.created_keys,
                        ))
                    })
                }
                Err(err) => {
                    let failure = WorkflowError::from_gateway(Action::CreateZephyrTests, &err);
                    self.write_action(snapshot.generation, Dispatch::Failed, |state| {
                        state.set_zephyr_status(ZephyrStatus::error(failure.message()))
                    })
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Zephyr creation against the configured default project
    pub async fn request_zephyr_creation_default(&self) -> Dispatch {
        self.request_zephyr_creation(self.settings.default_project_id)
            .await
    }

    /// Push the current test cases to the publish sink.
    ///
    /// A no-op returning [`Dispatch::Skipped`] unless tests were generated.
    pub async fn request_publish(&self) -> Dispatch {
        let Some(snapshot) = self.action_snapshot() else {
            debug!("Publish requested before test cases exist");
            return Dispatch::Skipped;
        };

        let correlation_id = generate_correlation_id();
        let span = create_workflow_span("publish_tests", Some(&snapshot.story.id), &correlation_id);

        async move {
            let started = self.write_action(snapshot.generation, Dispatch::Completed, |state| {
                state.set_publish_status(Status::info(Action::PublishTests.in_flight_message()))
            });
            if started == Dispatch::Superseded {
                return started;
            }

            let request = PublishRequest {
                story_id: snapshot.story.id.clone(),
                test_cases: snapshot.test_cases,
            };
            info!(count = request.test_cases.len(), "Publishing test cases");

            match self.gateway.publish_tests(&request).await {
                Ok(published) => {
                    self.write_action(snapshot.generation, Dispatch::Completed, |state| {
                        state.set_publish_status(Status::success(published.message))
                    })
                }
                Err(err) => {
                    let failure = WorkflowError::from_gateway(Action::PublishTests, &err);
                    self.write_action(snapshot.generation, Dispatch::Failed, |state| {
                        state.set_publish_status(Status::error(failure.message()))
                    })
                }
            }
        }
        .instrument(span)
        .await
    }
}
