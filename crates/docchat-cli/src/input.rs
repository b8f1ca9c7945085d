//! Line-based terminal input

use async_trait::async_trait;
use docchat_core::{InputProvider, Result};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Reads replies from stdin, one per line, and writes prompts to stdout
pub struct StdinInput {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinInput {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `prefix` without a newline and read the next line; `None` at EOF
    pub async fn read_line(&mut self, prefix: &str) -> Result<Option<String>> {
        print!("{}", prefix);
        std::io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InputProvider for StdinInput {
    async fn prompt(&mut self, message: &str) -> Result<Option<String>> {
        println!("Bot: {}", message);
        self.read_line("You: ").await
    }

    async fn notify(&mut self, message: &str) -> Result<()> {
        println!("Bot: {}", message);
        Ok(())
    }
}
