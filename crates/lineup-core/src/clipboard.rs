// Clipboard seam: where attendance text comes from when a workflow starts.

use anyhow::Result;
use async_trait::async_trait;

/// Source of the text an attendance workflow starts from.
#[async_trait]
pub trait ClipboardSource: Send + Sync {
    async fn read_text(&self) -> Result<String>;
}

/// Fixed text, for tests and for hosts that already hold the clipboard value.
#[derive(Debug, Clone, Default)]
pub struct StaticClipboard(pub String);

#[async_trait]
impl ClipboardSource for StaticClipboard {
    async fn read_text(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}
