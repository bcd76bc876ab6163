//! Tab-separated table on standard output.

use std::io::Write;

use async_trait::async_trait;
use forcepull_application::ports::{RecordSink, SinkError};
use tokio::sync::Mutex;

use super::tsv_line;

struct Inner<W> {
    out: W,
    header_written: bool,
}

/// Prints rows as tab-separated lines, preceded once by a header line.
pub struct ConsoleTableSink<W = std::io::Stdout> {
    inner: Mutex<Inner<W>>,
    header: Vec<String>,
}

impl ConsoleTableSink {
    /// A sink printing to standard output.
    #[must_use]
    pub fn stdout(header: Vec<String>) -> Self {
        Self::with_writer(std::io::stdout(), header)
    }
}

impl<W: Write + Send> ConsoleTableSink<W> {
    /// A sink printing to `out`.
    pub fn with_writer(out: W, header: Vec<String>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                out,
                header_written: false,
            }),
            header,
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.inner.into_inner().out
    }
}

#[async_trait]
impl<W: Write + Send> RecordSink for ConsoleTableSink<W> {
    async fn append_row(&self, row: &[String]) -> Result<(), SinkError> {
        let mut inner = self.inner.lock().await;
        let write_err = |e: std::io::Error| SinkError::Write(e.to_string());
        if !inner.header_written && !self.header.is_empty() {
            inner
                .out
                .write_all(tsv_line(&self.header).as_bytes())
                .map_err(write_err)?;
            inner.header_written = true;
        }
        inner
            .out
            .write_all(tsv_line(row).as_bytes())
            .map_err(write_err)?;
        inner.out.flush().map_err(write_err)
    }
}
