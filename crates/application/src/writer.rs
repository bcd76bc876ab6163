//! Projection of records onto output rows.

use std::sync::Arc;

use forcepull_domain::ApiRecord;

use crate::ports::{RecordSink, SinkError};

/// Writes records to a sink, one row per record.
pub struct RecordWriter {
    sink: Arc<dyn RecordSink>,
    columns: Vec<String>,
}

impl RecordWriter {
    /// Creates a writer projecting onto `columns`.
    #[must_use]
    pub fn new(sink: Arc<dyn RecordSink>, columns: Vec<String>) -> Self {
        Self { sink, columns }
    }

    /// Appends one row per record and returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Stops at the first row the sink fails to append.
    pub async fn write(&self, records: &[ApiRecord]) -> Result<usize, SinkError> {
        for record in records {
            self.sink.append_row(&record.project(&self.columns)).await?;
        }
        Ok(records.len())
    }
}
