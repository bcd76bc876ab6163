//! Data endpoint client.

use std::sync::Arc;

use forcepull_domain::{Credential, DomainError, FetchConfig, HttpRequest, HttpResponse};
use thiserror::Error;
use url::Url;

use crate::ports::{HttpClient, HttpClientError};

/// Errors raised before or while sending a data request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The stored instance URL is not a usable base URL.
    #[error("invalid instance URL '{url}': {message}")]
    InvalidInstanceUrl {
        /// The stored value
        url: String,
        /// Parser detail
        message: String,
    },

    /// The configured query could not be rendered.
    #[error("{0}")]
    Query(#[from] DomainError),

    /// A `nextRecordsUrl` pointed away from the instance host.
    #[error("next page URL leaves the instance host: {0}")]
    ForeignNextPage(String),

    /// No response from the data endpoint.
    #[error("{0}")]
    Transport(#[from] HttpClientError),
}

/// Issues authenticated requests against the data query endpoint.
pub struct DataFetcher<H: HttpClient> {
    http: Arc<H>,
    config: FetchConfig,
}

impl<H: HttpClient> DataFetcher<H> {
    /// Creates a fetcher for the given query configuration.
    pub const fn new(http: Arc<H>, config: FetchConfig) -> Self {
        Self { http, config }
    }

    /// The fetch configuration in use.
    #[must_use]
    pub const fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// `<instance_url>/services/data/<version>/query/?q=<query>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the instance URL or the query is unusable.
    pub fn query_url(&self, instance_url: &str) -> Result<Url, FetchError> {
        let soql = self.config.query.to_soql()?;
        let mut url = parse_instance_url(instance_url)?;
        // The instance URL names a host; any path it carries is replaced,
        // matching how `nextRecordsUrl` paths resolve against it.
        url.set_path(&format!("/services/data/{}/query/", self.config.api_version));
        url.set_query(None);
        url.set_fragment(None);
        url.query_pairs_mut().append_pair("q", &soql);
        Ok(url)
    }

    /// Resolves a provider `nextRecordsUrl` against the instance URL.
    ///
    /// # Errors
    ///
    /// Returns `ForeignNextPage` if the result is on another origin.
    pub fn page_url(&self, instance_url: &str, next_records_url: &str) -> Result<Url, FetchError> {
        let base = parse_instance_url(instance_url)?;
        let url = base
            .join(next_records_url)
            .map_err(|_| FetchError::ForeignNextPage(next_records_url.to_string()))?;
        if url.origin() != base.origin() {
            return Err(FetchError::ForeignNextPage(next_records_url.to_string()));
        }
        Ok(url)
    }

    /// Fetches the first page of the configured query.
    ///
    /// Error statuses are returned as responses, not raised.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be built or nothing came back.
    pub async fn get_data(&self, credential: &Credential) -> Result<HttpResponse, FetchError> {
        let url = self.query_url(&credential.instance_url)?;
        self.send(url, credential).await
    }

    /// Fetches a follow-up page.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is unusable or nothing came back.
    pub async fn get_page(
        &self,
        credential: &Credential,
        next_records_url: &str,
    ) -> Result<HttpResponse, FetchError> {
        let url = self.page_url(&credential.instance_url, next_records_url)?;
        self.send(url, credential).await
    }

    async fn send(&self, url: Url, credential: &Credential) -> Result<HttpResponse, FetchError> {
        let request = HttpRequest::get(url.as_str())
            .with_header("Authorization", credential.authorization_header())
            .with_header("Accept", "application/json");

        tracing::debug!(url = %url.path(), "fetching records");
        let response = self.http.send(&request).await?;
        tracing::debug!(status = response.status, "data endpoint answered");
        Ok(response)
    }
}

fn parse_instance_url(instance_url: &str) -> Result<Url, FetchError> {
    let url = Url::parse(instance_url).map_err(|e| FetchError::InvalidInstanceUrl {
        url: instance_url.to_string(),
        message: e.to_string(),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::InvalidInstanceUrl {
            url: instance_url.to_string(),
            message: "not an http(s) base URL".to_string(),
        });
    }
    Ok(url)
}
