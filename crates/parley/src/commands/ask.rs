//! Ask command - one-shot question to the assistant.

use anyhow::Result;
use clap::Args;
use console::Style;

use parley_agent::{Session, TurnOutcome};

use super::Context;

/// Arguments for the ask command.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question or prompt to send
    #[arg(required = true)]
    pub prompt: String,

    /// Print the whole thread instead of only the reply
    #[arg(long)]
    pub transcript: bool,
}

/// Run the ask command.
pub async fn run(args: AskArgs, ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;
    let orchestrator = ctx.orchestrator(&loaded.config)?;
    let dim = Style::new().dim();

    if ctx.verbose {
        println!(
            "{}",
            dim.apply_to(format!("Assistant: {}", orchestrator.config().assistant_id))
        );
        println!();
    }

    let mut session = Session::new();
    let outcome = orchestrator.respond(&mut session, &args.prompt).await?;

    match &outcome {
        TurnOutcome::Reply(transcript) if args.transcript => {
            println!("{}", transcript.text());
        }
        TurnOutcome::Reply(_) => {
            println!("{}", outcome.display_text());
        }
        TurnOutcome::RunFailed { .. } => {
            let red = Style::new().red();
            eprintln!("{} {}", red.apply_to("Error:"), outcome.display_text());
            anyhow::bail!("assistant run did not complete");
        }
    }

    if ctx.verbose
        && let Some(thread) = session.thread()
    {
        println!("{}", dim.apply_to(format!("Thread: {}", thread.id)));
    }

    Ok(())
}
