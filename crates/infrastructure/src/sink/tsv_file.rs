//! Tab-separated table appended to a file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use forcepull_application::ports::{FileSystem, RecordSink, SinkError};
use tokio::sync::Mutex;

use super::tsv_line;

/// Appends rows to a TSV file, creating it with a header line if needed.
pub struct TsvFileSink<F> {
    fs: F,
    path: PathBuf,
    header: Vec<String>,
    checked: Mutex<bool>,
}

impl<F: FileSystem> TsvFileSink<F> {
    /// Creates a sink appending to `path`.
    pub fn new(fs: F, path: impl Into<PathBuf>, header: Vec<String>) -> Self {
        Self {
            fs,
            path: path.into(),
            header,
            checked: Mutex::new(false),
        }
    }

    /// The output file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl<F: FileSystem> RecordSink for TsvFileSink<F> {
    async fn append_row(&self, row: &[String]) -> Result<(), SinkError> {
        let mut checked = self.checked.lock().await;
        let mut content = String::new();
        if !*checked {
            if !self.header.is_empty() && !self.fs.exists(&self.path).await {
                content.push_str(&tsv_line(&self.header));
            }
            *checked = true;
        }
        content.push_str(&tsv_line(row));
        self.fs.append_file(&self.path, content.as_bytes()).await?;
        Ok(())
    }
}
