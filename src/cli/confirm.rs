//! Interactive confirmation prompts on stdin.

use crate::error::{RecapError, Result};
use crate::orchestrator::{Confirmer, Decision};
use async_trait::async_trait;
use console::style;
use std::io::{self, Write};

/// Asks on the terminal before each video.
pub struct StdinConfirmer;

#[async_trait]
impl Confirmer for StdinConfirmer {
    async fn confirm_batch(&self, total: usize) -> Result<bool> {
        let answer = prompt(format!("Process all {} videos?", total), "[Y/n]").await?;
        Ok(parse_decision(&answer) == Decision::Yes)
    }

    async fn confirm_video(&self, index: usize, total: usize, title: &str) -> Result<Decision> {
        let answer = prompt(
            format!("Show summary {}/{}: {}?", index, total, style(title).bold()),
            "[Y/n/q]",
        )
        .await?;
        Ok(parse_decision(&answer))
    }
}

async fn prompt(message: String, choices: &'static str) -> Result<String> {
    tokio::task::spawn_blocking(move || -> io::Result<String> {
        print!("{} {} {} ", style("?").cyan(), message, style(choices).dim());
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input)
    })
    .await
    .map_err(|e| RecapError::Io(io::Error::other(e)))?
    .map_err(RecapError::from)
}

/// Interpret an answer. Empty means yes.
pub fn parse_decision(input: &str) -> Decision {
    match input.trim().to_lowercase().as_str() {
        "" | "y" | "yes" => Decision::Yes,
        "q" | "quit" => Decision::Quit,
        _ => Decision::Skip,
    }
}
