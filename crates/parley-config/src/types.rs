//! Configuration types mapping to the TOML schema.
//!
//! Top-level config:
//! ```toml
//! [service]                # where the assistant service lives and how to auth
//! [assistant]              # which assistant runs each turn
//! [run]                    # polling behaviour
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default delay between run status checks.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Default request timeout for the service client.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default `api-version` for Azure deployments.
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-02-15-preview";

/// Default title shown by interactive front ends.
pub const DEFAULT_TITLE: &str = "AI Support Center";

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParleyConfig {
    /// Assistant service connection.
    pub service: Option<ServiceConfig>,

    /// Assistant selection and run instructions.
    pub assistant: Option<AssistantConfig>,

    /// Run polling behaviour.
    pub run: Option<RunConfig>,
}

impl ParleyConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: ParleyConfig) {
        if other.service.is_some() {
            self.service = other.service;
        }

        if other.assistant.is_some() {
            self.assistant = other.assistant;
        }

        if other.run.is_some() {
            self.run = other.run;
        }
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// - `AZURE_OPENAI_ENDPOINT` + `AZURE_OPENAI_KEY` (both set) select Azure
    /// - `ASSISTANT_ID`, `RUN_INSTRUCTIONS`, `ASSISTANT_TITLE` override `[assistant]`
    ///
    /// API keys are not copied here; see [`crate::secrets::resolve_api_key`].
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let (Some(endpoint), Some(_)) = (get(AZURE_ENDPOINT_ENV), get(AZURE_KEY_ENV)) {
            let service = self.service.get_or_insert_with(ServiceConfig::default);
            service.provider = Some(ServiceProvider::Azure);
            service.azure_endpoint = Some(endpoint);
        }

        let assistant = self.assistant.get_or_insert_with(AssistantConfig::default);
        if let Some(id) = get(ASSISTANT_ID_ENV) {
            assistant.id = Some(id);
        }
        if let Some(instructions) = get(RUN_INSTRUCTIONS_ENV) {
            assistant.instructions = Some(instructions);
        }
        if let Some(title) = get(ASSISTANT_TITLE_ENV) {
            assistant.title = Some(title);
        }
    }

    /// Apply environment overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// The service section, or defaults.
    pub fn service(&self) -> ServiceConfig {
        self.service.clone().unwrap_or_default()
    }

    /// The assistant section, or defaults.
    pub fn assistant(&self) -> AssistantConfig {
        self.assistant.clone().unwrap_or_default()
    }

    /// The run section, or defaults.
    pub fn run(&self) -> RunConfig {
        self.run.clone().unwrap_or_default()
    }

    /// The assistant ID, which every run needs.
    pub fn require_assistant_id(&self) -> crate::Result<String> {
        self.assistant
            .as_ref()
            .and_then(|a| a.id.clone())
            .ok_or_else(|| crate::ConfigError::MissingField {
                field: "id".to_string(),
                context: format!("[assistant] (or set {})", ASSISTANT_ID_ENV),
            })
    }
}

pub(crate) const AZURE_ENDPOINT_ENV: &str = "AZURE_OPENAI_ENDPOINT";
pub(crate) const AZURE_KEY_ENV: &str = "AZURE_OPENAI_KEY";
pub(crate) const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";
const ASSISTANT_ID_ENV: &str = "ASSISTANT_ID";
const RUN_INSTRUCTIONS_ENV: &str = "RUN_INSTRUCTIONS";
const ASSISTANT_TITLE_ENV: &str = "ASSISTANT_TITLE";

// ─────────────────────────────────────────────────────────────────────────────
// Service
// ─────────────────────────────────────────────────────────────────────────────

/// Which deployment of the assistant service to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceProvider {
    /// Hosted API.
    #[default]
    OpenAi,
    /// Azure deployment.
    Azure,
}

impl ServiceProvider {
    /// Environment variable holding the API key for this provider.
    pub fn env_var(&self) -> &'static str {
        match self {
            ServiceProvider::OpenAi => OPENAI_KEY_ENV,
            ServiceProvider::Azure => AZURE_KEY_ENV,
        }
    }
}

impl std::fmt::Display for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceProvider::OpenAi => write!(f, "openai"),
            ServiceProvider::Azure => write!(f, "azure"),
        }
    }
}

/// `[service]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Provider (defaults to `openai`).
    pub provider: Option<ServiceProvider>,
    /// Base URL override for the hosted API (e.g., a proxy).
    pub base_url: Option<String>,
    /// Azure resource endpoint (required for `azure`).
    pub azure_endpoint: Option<String>,
    /// Azure `api-version`.
    pub api_version: Option<String>,
    /// API key (plaintext; prefer the environment).
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl ServiceConfig {
    /// Effective provider.
    pub fn provider(&self) -> ServiceProvider {
        self.provider.unwrap_or_default()
    }

    /// Effective Azure `api-version`.
    pub fn api_version(&self) -> &str {
        self.api_version
            .as_deref()
            .unwrap_or(DEFAULT_AZURE_API_VERSION)
    }

    /// Effective request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Returns true if an API key is stored directly in the config file.
    pub fn has_plaintext_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Assistant
// ─────────────────────────────────────────────────────────────────────────────

/// `[assistant]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Assistant that executes each run.
    pub id: Option<String>,
    /// Per-run instructions overriding the assistant's defaults.
    pub instructions: Option<String>,
    /// Title shown by interactive front ends.
    pub title: Option<String>,
}

impl AssistantConfig {
    /// Effective title.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Run
// ─────────────────────────────────────────────────────────────────────────────

/// `[run]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Delay between status checks, in milliseconds.
    pub poll_interval_ms: Option<u64>,
    /// Fetch and log run steps on every poll.
    pub trace_run_steps: Option<bool>,
}

impl RunConfig {
    /// Effective poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS))
    }

    /// Whether run steps are traced.
    pub fn trace_run_steps(&self) -> bool {
        self.trace_run_steps.unwrap_or(false)
    }
}
