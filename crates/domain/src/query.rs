//! Structured query builder.
//!
//! Queries are assembled from validated identifiers and quoted literals,
//! then handed to the URL layer which percent-encodes the whole text.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A `SELECT <fields> FROM <object> [WHERE ...] [LIMIT n]` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoqlQuery {
    /// Selected fields
    pub fields: Vec<String>,
    /// Queried object
    pub object: String,
    /// Conditions joined with `AND`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    /// Optional row limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl Default for SoqlQuery {
    fn default() -> Self {
        Self::select(["Name", "Phone", "Industry"], "Account")
    }
}

impl SoqlQuery {
    /// Creates a query selecting `fields` from `object`.
    #[must_use]
    pub fn select<I, S>(fields: I, object: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            object: object.into(),
            filters: Vec::new(),
            limit: None,
        }
    }

    /// Adds a condition.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sets the row limit.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Validates every identifier in the query.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuery` on an empty field list or an unsafe identifier.
    pub fn validate(&self) -> DomainResult<()> {
        if self.fields.is_empty() {
            return Err(DomainError::InvalidQuery("no fields selected".to_string()));
        }
        for field in &self.fields {
            check_identifier(field)?;
        }
        check_identifier(&self.object)?;
        for filter in &self.filters {
            check_identifier(&filter.field)?;
        }
        Ok(())
    }

    /// Renders the query text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuery` if validation fails.
    pub fn to_soql(&self) -> DomainResult<String> {
        self.validate()?;
        let mut soql = format!("SELECT {} FROM {}", self.fields.join(", "), self.object);
        if !self.filters.is_empty() {
            let conditions: Vec<String> = self.filters.iter().map(Filter::render).collect();
            soql.push_str(" WHERE ");
            soql.push_str(&conditions.join(" AND "));
        }
        if let Some(limit) = self.limit {
            soql.push_str(&format!(" LIMIT {limit}"));
        }
        Ok(soql)
    }
}

fn check_identifier(name: &str) -> DomainResult<()> {
    let valid = !name.is_empty()
        && name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(DomainError::InvalidQuery(format!(
            "invalid identifier: {name:?}"
        )))
    }
}

/// A single `<field> <op> <value>` condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Field the condition applies to
    pub field: String,
    /// Comparison operator
    pub operator: FilterOperator,
    /// Literal compared against
    pub value: FilterValue,
}

impl Filter {
    /// Creates an equality condition.
    #[must_use]
    pub fn equals(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::Eq,
            value: value.into(),
        }
    }

    /// Creates a condition with an explicit operator.
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    fn render(&self) -> String {
        format!(
            "{} {} {}",
            self.field,
            self.operator.as_str(),
            self.value.literal()
        )
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `LIKE`
    Like,
}

impl FilterOperator {
    /// Operator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Like => "LIKE",
        }
    }
}

/// Literal values usable in a condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// `true` / `false`
    Bool(bool),
    /// Integer literal
    Integer(i64),
    /// Quoted string literal
    Text(String),
}

impl FilterValue {
    fn literal(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Text(s) => {
                let escaped = s.replace('\\', "\\\\").replace('\'', "\\'");
                format!("'{escaped}'")
            }
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
