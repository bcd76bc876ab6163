//! Records returned by the data endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};

/// A provider-defined record.
///
/// Opaque beyond field lookup; the `attributes` metadata object sent by
/// the provider is kept but never projected unless asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiRecord {
    fields: Map<String, Value>,
}

impl ApiRecord {
    /// Builds a record from field/value pairs.
    #[must_use]
    pub fn from_fields<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Raw value of a field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Display text of a field.
    ///
    /// Missing and `null` fields render as an empty string, strings as-is,
    /// everything else as compact JSON.
    #[must_use]
    pub fn field_text(&self, name: &str) -> String {
        match self.fields.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Projects the record onto `columns`, in order.
    #[must_use]
    pub fn project(&self, columns: &[String]) -> Vec<String> {
        columns.iter().map(|c| self.field_text(c)).collect()
    }
}

/// Query response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryEnvelope {
    /// Total rows matched by the query across all pages
    #[serde(default)]
    pub total_size: u64,
    /// Whether this is the last page
    #[serde(default = "default_done")]
    pub done: bool,
    /// Relative URL of the next page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_records_url: Option<String>,
    /// Records on this page
    #[serde(default)]
    pub records: Vec<ApiRecord>,
}

const fn default_done() -> bool {
    true
}

impl QueryEnvelope {
    /// Parses a data endpoint body.
    ///
    /// # Errors
    ///
    /// Returns `MalformedQueryResponse` if the body is not an envelope.
    pub fn parse(body: &str) -> DomainResult<Self> {
        serde_json::from_str(body).map_err(|e| DomainError::MalformedQueryResponse(e.to_string()))
    }

    /// The next page to fetch, if the provider reported more.
    #[must_use]
    pub fn next_page(&self) -> Option<&str> {
        if self.done {
            None
        } else {
            self.next_records_url.as_deref().filter(|u| !u.is_empty())
        }
    }
}
