//! CLI command handlers.

pub mod ask;
pub mod chat;
pub mod config;
pub mod repl;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use parley_agent::{Orchestrator, ToolRegistry};
use parley_client::ParleyClient;
use parley_config::{LoadedConfig, ParleyConfig, ResolvedService, ServiceProvider};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// User config directory override.
    pub config_dir: Option<PathBuf>,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Load the layered config with environment overrides applied.
    pub fn load_config(&self) -> Result<LoadedConfig> {
        let mut loaded = parley_config::load_config_with_options(None, self.config_dir.as_deref())?;
        loaded.config.apply_env();
        for warning in &loaded.warnings {
            tracing::warn!("{}", warning);
        }
        Ok(loaded)
    }

    /// Build an orchestrator for the resolved service and assistant.
    pub fn orchestrator(&self, config: &ParleyConfig) -> Result<Orchestrator> {
        let assistant_id = config.require_assistant_id()?;
        let service = parley_config::resolve_service(config)?;
        let client = build_client(&service)?;
        tracing::debug!(
            provider = %service.provider,
            key_source = %service.api_key.source,
            "Resolved service"
        );

        let assistant = config.assistant();
        let run = config.run();
        let mut builder = Orchestrator::builder()
            .with_service(client)
            // Concrete tools live with the deployment; an empty registry
            // fails any tool request with an unknown-tool error.
            .with_tools(ToolRegistry::new())
            .with_assistant_id(assistant_id)
            .with_poll_interval(run.poll_interval())
            .with_trace_run_steps(run.trace_run_steps());
        if let Some(instructions) = assistant.instructions {
            builder = builder.with_instructions(instructions);
        }
        Ok(builder.build()?)
    }
}

/// Create an HTTP client for the resolved service settings.
pub fn build_client(service: &ResolvedService) -> Result<ParleyClient> {
    let mut builder = ParleyClient::builder()
        .api_key(&service.api_key.value)
        .timeout(service.timeout)
        .user_agent(concat!("parley/", env!("CARGO_PKG_VERSION")));

    builder = match service.provider {
        ServiceProvider::Azure => {
            let endpoint = service
                .azure_endpoint
                .as_deref()
                .context("Azure provider requires an endpoint")?;
            builder.azure(endpoint, &service.api_version)
        }
        ServiceProvider::OpenAi => match &service.base_url {
            Some(url) => builder.base_url(url),
            None => builder,
        },
    };

    Ok(builder.build()?)
}

/// Mask a secret for display, keeping a short prefix and suffix.
pub fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}
