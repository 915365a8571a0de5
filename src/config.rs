use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::{ProjectId, DEFAULT_PROJECT_ID};

/// Main configuration structure for story-testgen
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoryTestgenConfig {
    /// Backend service settings
    pub backend: BackendConfig,
    /// Zephyr Scale settings
    pub zephyr: ZephyrConfig,
    /// Fetch/generate chain behaviour
    pub workflow: WorkflowConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend service
    pub base_url: String,
    /// Per-request timeout; absent means requests may hang indefinitely
    pub request_timeout_seconds: Option<u64>,
    /// Endpoint paths relative to `base_url`
    pub endpoints: EndpointConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub fetch_story: String,
    pub generate_tests: String,
    pub create_zephyr_tests: String,
    pub publish_tests: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ZephyrConfig {
    /// Project that receives created test cases unless one is given explicitly
    pub default_project_id: ProjectId,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// How a new story submission treats a chain that is still in flight
    pub chain_policy: ChainPolicy,
}

/// Policy for overlapping fetch→generate chains
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainPolicy {
    /// A new submission cancels the chain in flight
    #[default]
    Supersede,
    /// Chains run to completion and whichever resolves last wins
    LastResolutionWins,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON formatted logs
    pub json_logs: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_seconds: None,
            endpoints: EndpointConfig::default(),
        }
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            fetch_story: "/fetch_story".to_string(),
            generate_tests: "/generate_tests".to_string(),
            create_zephyr_tests: "/create_zephyr_tests_ui".to_string(),
            publish_tests: "/publish_tests".to_string(),
        }
    }
}

impl Default for ZephyrConfig {
    fn default() -> Self {
        Self {
            default_project_id: DEFAULT_PROJECT_ID,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl StoryTestgenConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (story-testgen.toml, .story-testgen-rc)
    /// 3. Environment variables (prefixed with STORY_TESTGEN_, `__` between sections)
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Same as [`load`](Self::load) with an extra file that overrides the
    /// discovered ones.
    pub fn load_from(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if Path::new("story-testgen.toml").exists() {
            builder = builder.add_source(File::with_name("story-testgen"));
        }

        if Path::new(".story-testgen-rc").exists() {
            builder = builder.add_source(
                File::with_name(".story-testgen-rc").format(config::FileFormat::Toml),
            );
        }

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("STORY_TESTGEN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let loaded: StoryTestgenConfig = config.try_deserialize()?;
        Ok(loaded)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_backend_routes() {
        let config = StoryTestgenConfig::default();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.backend.endpoints.fetch_story, "/fetch_story");
        assert_eq!(
            config.backend.endpoints.create_zephyr_tests,
            "/create_zephyr_tests_ui"
        );
        assert_eq!(config.zephyr.default_project_id, 10000);
        assert_eq!(config.workflow.chain_policy, ChainPolicy::Supersede);
        assert_eq!(config.backend.request_timeout_seconds, None);
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            r#"
[backend]
base_url = "http://backend.internal:8080"

[zephyr]
default_project_id = 20345

[workflow]
chain_policy = "last_resolution_wins"
"#,
        )
        .unwrap();

        let config = StoryTestgenConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.backend.base_url, "http://backend.internal:8080");
        assert_eq!(config.backend.endpoints.publish_tests, "/publish_tests");
        assert_eq!(config.zephyr.default_project_id, 20345);
        assert_eq!(config.workflow.chain_policy, ChainPolicy::LastResolutionWins);
    }

    #[test]
    fn saved_config_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut original = StoryTestgenConfig::default();
        original.observability.json_logs = true;
        original.backend.request_timeout_seconds = Some(45);
        original.save_to_file(&path).unwrap();

        let loaded = StoryTestgenConfig::load_from(Some(&path)).unwrap();
        assert_eq!(loaded, original);
    }
}
