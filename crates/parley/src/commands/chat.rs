//! Chat command - interactive REPL mode.

use anyhow::Result;
use clap::Args;

use super::Context;
use super::repl::Repl;

/// Arguments for the chat command.
#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Banner shown above the prompt (default: assistant title from config)
    #[arg(long)]
    pub title: Option<String>,
}

/// Run the chat command (REPL).
pub async fn run(args: ChatArgs, ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;
    let orchestrator = ctx.orchestrator(&loaded.config)?;
    let title = args
        .title
        .unwrap_or_else(|| loaded.config.assistant().title().to_string());

    let mut repl = Repl::new(orchestrator, title, ctx.verbose)?;
    repl.run().await
}
