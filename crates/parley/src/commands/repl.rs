//! REPL (Read-Eval-Print Loop) implementation for interactive chat.

use anyhow::Result;
use console::{Style, Term, style};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};

use parley_agent::{Orchestrator, Session, TurnOutcome};

/// REPL state and configuration.
pub struct Repl {
    orchestrator: Orchestrator,
    session: Session,
    title: String,
    editor: Editor<(), DefaultHistory>,
    term: Term,
    verbose: bool,
}

impl Repl {
    /// Create a new REPL instance.
    pub fn new(orchestrator: Orchestrator, title: String, verbose: bool) -> Result<Self> {
        let config = Config::builder()
            .history_ignore_space(true)
            .auto_add_history(true)
            .build();

        let editor = Editor::with_config(config)?;

        Ok(Self {
            orchestrator,
            session: Session::new(),
            title,
            editor,
            term: Term::stdout(),
            verbose,
        })
    }

    /// Run the REPL loop.
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        loop {
            let prompt = self.format_prompt();

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        match self.handle_slash_command(line).await {
                            Ok(ControlFlow::Continue) => continue,
                            Ok(ControlFlow::Exit) => break,
                            Err(e) => {
                                self.print_error(&format!("Command error: {}", e));
                                continue;
                            }
                        }
                    }

                    if let Err(e) = self.send_message(line).await {
                        self.print_error(&e.to_string());
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!();
                    self.print_dim("(Interrupted - type /quit to exit)");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(e) => {
                    self.print_error(&format!("Input error: {}", e));
                    break;
                }
            }
        }

        self.print_dim("Goodbye!");
        Ok(())
    }

    /// Send a message and print the assistant's reply.
    async fn send_message(&mut self, message: &str) -> Result<()> {
        self.print_dim("…");
        let outcome = self.orchestrator.respond(&mut self.session, message).await?;

        match &outcome {
            TurnOutcome::Reply(_) => {
                println!("{}", outcome.display_text());
                println!();
            }
            TurnOutcome::RunFailed { run_id, .. } => {
                self.print_error(&outcome.display_text());
                if self.verbose {
                    self.print_dim(&format!("run: {}", run_id));
                }
            }
        }

        Ok(())
    }

    /// Handle a slash command.
    async fn handle_slash_command(&mut self, input: &str) -> Result<ControlFlow> {
        let cmd = input[1..].split_whitespace().next().unwrap_or("");

        match cmd {
            "quit" | "q" | "exit" => {
                return Ok(ControlFlow::Exit);
            }
            "help" | "h" | "?" => {
                self.print_help();
            }
            "clear" | "cls" => {
                self.term.clear_screen()?;
            }
            "new" => {
                self.session = Session::new();
                self.print_dim("Started new conversation");
            }
            "thread" => {
                if let Some(thread) = self.session.thread() {
                    println!("Current thread: {}", thread.id);
                } else {
                    self.print_dim("No thread yet (will create on first message)");
                }
            }
            "transcript" => {
                self.print_transcript().await?;
            }
            "" => {
                self.print_dim("Type /help for available commands");
            }
            _ => {
                self.print_error(&format!("Unknown command: /{}", cmd));
                self.print_dim("Type /help for available commands");
            }
        }

        Ok(ControlFlow::Continue)
    }

    async fn print_transcript(&self) -> Result<()> {
        let Some(thread) = self.session.thread() else {
            self.print_dim("No thread yet");
            return Ok(());
        };

        let transcript = self.orchestrator.extract(thread).await?;
        let dim = Style::new().dim();
        for entry in transcript.entries() {
            println!("{} {}", dim.apply_to(format!("[{}]", entry.role)), entry.text);
        }
        println!();
        Ok(())
    }

    fn print_welcome(&self) {
        let dim = Style::new().dim();
        println!();
        println!("{}", style(&self.title).bold().cyan());
        println!("{}", dim.apply_to("─".repeat(40)));
        println!(
            "{}",
            dim.apply_to("Type your message and press Enter to chat.")
        );
        println!(
            "{}",
            dim.apply_to("Use /help for commands, Ctrl+D to exit.")
        );
        println!();
    }

    fn print_help(&self) {
        let dim = Style::new().dim();
        println!();
        println!("{}", style("Available Commands").bold());
        println!("{}", dim.apply_to("─".repeat(40)));
        println!("  {}  - Exit the REPL", style("/quit, /q").cyan());
        println!("  {}  - Show this help", style("/help, /h, /?").cyan());
        println!("  {}  - Clear the screen", style("/clear").cyan());
        println!("  {}  - Start a new conversation", style("/new").cyan());
        println!("  {}  - Show current thread ID", style("/thread").cyan());
        println!("  {}  - Show the whole conversation", style("/transcript").cyan());
        println!();
        println!("{}", dim.apply_to("Keyboard shortcuts:"));
        println!("  {} - Cancel the current line", dim.apply_to("Ctrl+C"));
        println!("  {} - Exit the REPL", dim.apply_to("Ctrl+D"));
        println!();
    }

    fn format_prompt(&self) -> String {
        format!("{} ", style("you>").cyan().bold())
    }

    fn print_dim(&self, msg: &str) {
        let dim = Style::new().dim();
        println!("{}", dim.apply_to(msg));
    }

    fn print_error(&self, msg: &str) {
        let red = Style::new().red();
        println!("{} {}", red.apply_to("Error:"), msg);
    }
}

/// Control flow for the REPL.
pub enum ControlFlow {
    Continue,
    Exit,
}
