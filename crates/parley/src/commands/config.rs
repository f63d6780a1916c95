//! Config command - configuration management.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{Context, redact};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the resolved configuration (API key redacted)
    Show,

    /// Show which config files are loaded and their precedence
    Which,

    /// Initialize a config file with defaults
    Init {
        /// Create project-local config (./parley.toml) instead of user config
        #[arg(long)]
        local: bool,
    },

    /// Show configuration file path
    Path,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Which => cmd_which(ctx),
        ConfigCommand::Init { local } => cmd_init(ctx, local),
        ConfigCommand::Path => cmd_path(ctx),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;
    let config = &loaded.config;

    println!("# parley Configuration\n");

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("No config files loaded (using defaults)\n");
    } else {
        println!("Config files:");
        for source in &sources {
            println!("  {}", source.display());
        }
        println!();
    }

    let service = config.service();
    println!("Service:");
    println!("  provider: {}", service.provider());
    if let Some(ref url) = service.base_url {
        println!("  base_url: {}", url);
    }
    if let Some(ref endpoint) = service.azure_endpoint {
        println!("  azure_endpoint: {}", endpoint);
        println!("  api_version: {}", service.api_version());
    }
    println!("  timeout: {}s", service.timeout().as_secs());
    match parley_config::resolve_service(config) {
        Ok(resolved) => println!(
            "  api_key: {} ({})",
            redact(&resolved.api_key.value),
            resolved.api_key.source
        ),
        Err(e) => println!("  api_key: (unresolved: {})", e),
    }
    println!();

    let assistant = config.assistant();
    println!("Assistant:");
    println!("  id: {}", assistant.id.as_deref().unwrap_or("(not set)"));
    println!("  title: {}", assistant.title());
    if let Some(ref instructions) = assistant.instructions {
        println!("  instructions: {}", instructions);
    }
    println!();

    let run = config.run();
    println!("Run:");
    println!("  poll_interval: {}ms", run.poll_interval().as_millis());
    println!("  trace_run_steps: {}", run.trace_run_steps());
    println!();

    if !loaded.warnings.is_empty() {
        println!("Warnings:");
        for w in &loaded.warnings {
            println!("  ⚠ {}", w);
        }
        println!();
    }

    Ok(())
}

fn cmd_which(ctx: &Context) -> Result<()> {
    let loaded = parley_config::load_config_with_options(None, ctx.config_dir.as_deref())?;

    println!("Config file search order (later overrides earlier):\n");

    for source in &loaded.sources {
        let status = if source.loaded {
            "✓ loaded"
        } else {
            "· not found"
        };
        println!("  {} {}", status, source.path.display());
    }

    println!();
    let loaded_count = loaded.loaded_from().len();
    if loaded_count == 0 {
        println!("No config files found. Run 'parley config init' to create one.");
    } else {
        println!("{} config file(s) loaded.", loaded_count);
    }

    Ok(())
}

fn user_config_dir(ctx: &Context) -> Result<PathBuf> {
    ctx.config_dir
        .clone()
        .or_else(parley_config::xdg_config_dir)
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

fn cmd_init(ctx: &Context, local: bool) -> Result<()> {
    let path = if local {
        PathBuf::from("parley.toml")
    } else {
        let dir = user_config_dir(ctx)?;
        std::fs::create_dir_all(&dir)?;
        dir.join("config.toml")
    };

    if path.exists() {
        println!("Config file already exists: {}", path.display());
        return Ok(());
    }

    std::fs::write(&path, TEMPLATE)?;
    println!("✓ Created config file: {}", path.display());
    println!("  Set [assistant].id and export OPENAI_API_KEY to get started.");
    Ok(())
}

fn cmd_path(ctx: &Context) -> Result<()> {
    let path = user_config_dir(ctx)?.join("config.toml");
    println!("{}", path.display());
    Ok(())
}

const TEMPLATE: &str = r#"# parley configuration

[service]
provider = "openai"
# base_url = "https://api.openai.com/v1/"
# timeout_secs = 30

# Azure deployment (or set AZURE_OPENAI_ENDPOINT and AZURE_OPENAI_KEY)
# provider = "azure"
# azure_endpoint = "https://my-resource.openai.azure.com"
# api_version = "2024-02-15-preview"

[assistant]
# id = "asst_..."
# instructions = "Answer briefly."
# title = "AI Support Center"

[run]
# poll_interval_ms = 1000
# trace_run_steps = false
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses() {
        let config = parley_config::ParleyConfig::from_toml(TEMPLATE).unwrap();
        assert_eq!(
            config.service().provider(),
            parley_config::ServiceProvider::OpenAi
        );
        assert!(config.assistant().id.is_none());
    }
}
