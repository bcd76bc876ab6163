//! Request orchestration state machine.
//!
//! One `run` fetches the configured query with a stored credential and
//! decides, per response, whether to accept the records, refresh the
//! access token and retry, or fall back to a full login:
//!
//! ```text
//! Idle -> Fetching -> Succeeded
//!                  -> RefreshingThenRetry -> Fetching (once per run)
//!                  -> LoggingIn
//!                  -> FatalError
//! ```

use std::sync::Arc;

use forcepull_domain::{Credential, FetchOutcome, OrchestratorState};
use thiserror::Error;

use crate::auth::{AuthFlow, ExchangeError, LoginPrompt, TokenExchanger};
use crate::fetch::{DataFetcher, FetchError};
use crate::ports::{CredentialStore, HttpClient, SinkError, StoreError};
use crate::writer::RecordWriter;

/// Why a run ended in `FatalError`.
#[derive(Debug, Error)]
pub enum RunFailure {
    /// The data endpoint answered with a non-auth error status.
    #[error("Error {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The refreshed access token was rejected as well.
    #[error("Error 401: access token rejected after refresh")]
    RejectedAfterRefresh,

    /// The data request could not be sent.
    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// The refresh grant failed in a way a login would not fix.
    #[error("{0}")]
    Refresh(#[from] ExchangeError),

    /// Rows could not be written.
    #[error("{0}")]
    Sink(#[from] SinkError),

    /// The credential store failed.
    #[error("{0}")]
    Store(#[from] StoreError),
}

/// Terminal result of one run.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every fetched page was written.
    Succeeded {
        /// Rows appended to the sink
        rows_written: usize,
        /// Pages fetched
        pages: usize,
    },
    /// The user must authorize again.
    LoggingIn(LoginPrompt),
    /// The run ended with a user-visible failure.
    Failed(RunFailure),
}

impl RunOutcome {
    /// The terminal state this outcome corresponds to.
    #[must_use]
    pub const fn state(&self) -> OrchestratorState {
        match self {
            Self::Succeeded { .. } => OrchestratorState::Succeeded,
            Self::LoggingIn(_) => OrchestratorState::LoggingIn,
            Self::Failed(_) => OrchestratorState::FatalError,
        }
    }

    /// Check if the run succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Drives fetch, refresh-and-retry and login fallback for one credential.
pub struct RequestOrchestrator<H: HttpClient> {
    fetcher: DataFetcher<H>,
    exchanger: Arc<TokenExchanger<H>>,
    flow: Arc<AuthFlow<H>>,
    writer: RecordWriter,
    store: Arc<dyn CredentialStore>,
}

impl<H: HttpClient> RequestOrchestrator<H> {
    /// Creates an orchestrator from its collaborators.
    pub fn new(
        fetcher: DataFetcher<H>,
        exchanger: Arc<TokenExchanger<H>>,
        flow: Arc<AuthFlow<H>>,
        writer: RecordWriter,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            fetcher,
            exchanger,
            flow,
            writer,
            store,
        }
    }

    /// Runs the state machine to a terminal state.
    ///
    /// At most one refresh is attempted per run, shared across pages; the
    /// page that triggered it is fetched again exactly once.
    pub async fn run(&self, credential: Credential) -> RunOutcome {
        let max_pages = self.fetcher.config().max_pages;
        let mut credential = credential;
        let mut state = OrchestratorState::Idle;
        let mut refreshed = false;
        let mut next_page: Option<String> = None;
        let mut pages = 0;
        let mut rows_written = 0;

        loop {
            state = transition(state, OrchestratorState::Fetching);
            let sent = match &next_page {
                None => self.fetcher.get_data(&credential).await,
                Some(url) => self.fetcher.get_page(&credential, url).await,
            };
            let response = match sent {
                Ok(response) => response,
                Err(e) => return fail(state, e.into()),
            };

            match FetchOutcome::classify(&response) {
                FetchOutcome::Success(envelope) => {
                    pages += 1;
                    match self.writer.write(&envelope.records).await {
                        Ok(n) => rows_written += n,
                        Err(e) => return fail(state, e.into()),
                    }
                    match envelope.next_page() {
                        Some(url) if pages < max_pages => {
                            next_page = Some(url.to_string());
                        }
                        more => {
                            if more.is_some() {
                                tracing::warn!(
                                    max_pages,
                                    total_size = envelope.total_size,
                                    "page limit reached, remaining records skipped"
                                );
                            }
                            transition(state, OrchestratorState::Succeeded);
                            tracing::info!(rows_written, pages, "fetch succeeded");
                            return RunOutcome::Succeeded {
                                rows_written,
                                pages,
                            };
                        }
                    }
                }
                FetchOutcome::AuthExpired if !refreshed => {
                    refreshed = true;
                    state = transition(state, OrchestratorState::RefreshingThenRetry);
                    match self.exchanger.refresh().await {
                        Ok(true) => match self.store.load().await {
                            Ok(Some(renewed)) => credential = renewed,
                            Ok(None) => return self.login(state),
                            Err(e) => return fail(state, e.into()),
                        },
                        Ok(false) => return self.login(state),
                        Err(e) => return fail(state, e.into()),
                    }
                }
                FetchOutcome::AuthExpired => {
                    return fail(state, RunFailure::RejectedAfterRefresh);
                }
                FetchOutcome::TransientError { status, body } => {
                    return fail(state, RunFailure::Status { status, body });
                }
            }
        }
    }

    fn login(&self, state: OrchestratorState) -> RunOutcome {
        transition(state, OrchestratorState::LoggingIn);
        RunOutcome::LoggingIn(self.flow.login())
    }
}

fn fail(state: OrchestratorState, failure: RunFailure) -> RunOutcome {
    transition(state, OrchestratorState::FatalError);
    tracing::warn!(error = %failure, "fetch failed");
    RunOutcome::Failed(failure)
}

fn transition(from: OrchestratorState, to: OrchestratorState) -> OrchestratorState {
    tracing::debug!(%from, %to, "orchestrator transition");
    to
}
