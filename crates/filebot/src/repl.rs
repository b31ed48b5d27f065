//! Interactive REPL standing in for the chat gateway

use anyhow::Result;
use filebot::DEFAULT_SESSION;
use llm_core::Config;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::commands::{build_agent, reply_to};

// ANSI colors
const CYAN: &str = "\x1b[96m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

pub async fn run(config: Config, model: Option<String>) -> Result<()> {
    let agent = build_agent(&config, model);
    let mut editor = DefaultEditor::new()?;

    println!(
        "{}filebot{} using {} (/history, /clear, /exit)",
        CYAN,
        RESET,
        agent.config().model
    );

    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let _ = editor.add_history_entry(line.as_str());

        match line.trim() {
            "/exit" | "/quit" => break,
            "/history" => {
                let turns = agent.history(DEFAULT_SESSION).await;
                println!("{}{} turns in history{}", DIM, turns.len(), RESET);
                for turn in turns {
                    println!("{}[{}]{} {}", DIM, turn.role, RESET, turn.content);
                }
            }
            "/clear" => {
                agent.sessions().reset(DEFAULT_SESSION);
                println!("{}History cleared{}", DIM, RESET);
            }
            _ => {
                let reply = reply_to(&agent, &config, &line).await;
                println!("{}\n", reply);
            }
        }
    }

    Ok(())
}
