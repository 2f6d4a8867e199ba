// Clipboard sources available from a terminal: standard input or a text file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lineup_core::clipboard::ClipboardSource;
use tokio::io::AsyncReadExt;

/// Reads everything piped to stdin, e.g. `pbpaste | lineup attend`.
pub struct StdinClipboard;

#[async_trait]
impl ClipboardSource for StdinClipboard {
    async fn read_text(&self) -> Result<String> {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read attendance text from stdin")?;
        Ok(text)
    }
}

/// Reads a saved copy of the attendance message.
pub struct FileClipboard(pub PathBuf);

#[async_trait]
impl ClipboardSource for FileClipboard {
    async fn read_text(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.0)
            .await
            .with_context(|| format!("failed to read attendance text from {}", self.0.display()))
    }
}
