//! Terminal input and output

use crate::error::{AppError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

/// Operator-facing terminal
#[async_trait]
pub trait Terminal: Send + Sync {
    /// Show `message` and wait for one line of input
    async fn prompt(&self, message: &str) -> Result<String>;

    /// Show a message
    async fn report(&self, message: &str) -> Result<()>;
}

/// Interactive terminal on stdin/stdout
pub struct StdTerminal {
    lines: tokio::sync::Mutex<Lines<BufReader<Stdin>>>,
}

impl StdTerminal {
    pub fn new() -> Self {
        Self {
            lines: tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Default for StdTerminal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Terminal for StdTerminal {
    async fn prompt(&self, message: &str) -> Result<String> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(message.as_bytes()).await?;
        stdout.flush().await?;

        let mut lines = self.lines.lock().await;
        match lines.next_line().await? {
            Some(line) => Ok(line),
            None => Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "input closed",
            ))),
        }
    }

    async fn report(&self, message: &str) -> Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(message.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
        Ok(())
    }
}

/// Terminal fed from a fixed list of answers, recording everything shown
#[derive(Default)]
pub struct ScriptedTerminal {
    answers: Mutex<VecDeque<String>>,
    output: Mutex<Vec<String>>,
}

impl ScriptedTerminal {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            output: Mutex::new(Vec::new()),
        }
    }

    /// Prompts and reports shown so far
    pub fn output(&self) -> Vec<String> {
        self.output.lock().clone()
    }

    /// Answers not yet consumed
    pub fn remaining(&self) -> usize {
        self.answers.lock().len()
    }
}

#[async_trait]
impl Terminal for ScriptedTerminal {
    async fn prompt(&self, message: &str) -> Result<String> {
        self.output.lock().push(message.to_string());
        self.answers.lock().pop_front().ok_or_else(|| {
            AppError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "script exhausted",
            ))
        })
    }

    async fn report(&self, message: &str) -> Result<()> {
        self.output.lock().push(message.to_string());
        Ok(())
    }
}
