//! Output table port.

use async_trait::async_trait;

/// Errors raised while appending rows.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The row could not be written.
    #[error("write failed: {0}")]
    Write(String),

    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] super::FileSystemError),
}

/// An append-only table.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Appends one row, cells in column order.
    async fn append_row(&self, row: &[String]) -> Result<(), SinkError>;
}
