//! Line-based terminal input

use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

use crate::utils::errors::{VpassError, Result};

/// Reads answers from stdin one line at a time
pub struct Prompter {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompter {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(io::stdin()).lines(),
        }
    }

    /// Ask for a line; end of input is an error
    pub async fn ask(&mut self, label: &str) -> Result<String> {
        let mut stdout = io::stdout();
        stdout.write_all(format!("{}: ", label).as_bytes()).await?;
        stdout.flush().await?;

        match self.lines.next_line().await? {
            Some(line) => Ok(line.trim().to_string()),
            None => Err(VpassError::InvalidInput("Input closed".to_string())),
        }
    }

    /// Ask until a non-empty answer is given
    pub async fn ask_required(&mut self, label: &str) -> Result<String> {
        loop {
            let answer = self.ask(label).await?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            println!("{} is required", label);
        }
    }

    /// Empty answer becomes `None`
    pub async fn ask_optional(&mut self, label: &str) -> Result<Option<String>> {
        let answer = self.ask(&format!("{} (optional)", label)).await?;
        Ok(Some(answer).filter(|a| !a.is_empty()))
    }

    pub async fn confirm(&mut self, label: &str) -> Result<bool> {
        let answer = self.ask(&format!("{} [y/N]", label)).await?;
        Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}

impl Default for Prompter {
    fn default() -> Self {
        Self::new()
    }
}
