//! Single trigger: fetch with the stored credential or ask for a login.

use std::sync::Arc;

use forcepull_domain::{FetchConfig, OAuthConfig};
use tokio::sync::Mutex;

use crate::auth::{AuthFlow, CallbackPage, CallbackParams, TokenExchanger};
use crate::error::ApplicationResult;
use crate::fetch::DataFetcher;
use crate::orchestrator::{RequestOrchestrator, RunFailure, RunOutcome};
use crate::ports::{CredentialStore, HttpClient, Presenter, RecordSink, StoreError};
use crate::writer::RecordWriter;

/// Wires the components for one user and serializes their runs.
///
/// Every operation that can write credentials holds the run lock, so two
/// triggers through the same entry point never refresh concurrently. The
/// lock does not reach other entry points or other processes.
pub struct EntryPoint<H: HttpClient> {
    store: Arc<dyn CredentialStore>,
    flow: Arc<AuthFlow<H>>,
    orchestrator: RequestOrchestrator<H>,
    presenter: Arc<dyn Presenter>,
    run_lock: Mutex<()>,
}

impl<H: HttpClient> EntryPoint<H> {
    /// Builds every component from the two configuration objects.
    ///
    /// # Errors
    ///
    /// Returns an error if either configuration is invalid.
    pub fn new(
        oauth: OAuthConfig,
        fetch: FetchConfig,
        http: Arc<H>,
        store: Arc<dyn CredentialStore>,
        sink: Arc<dyn RecordSink>,
        presenter: Arc<dyn Presenter>,
    ) -> ApplicationResult<Self> {
        fetch.validate()?;
        let exchanger = Arc::new(TokenExchanger::new(
            Arc::clone(&http),
            oauth,
            Arc::clone(&store),
        ));
        let flow = Arc::new(AuthFlow::new(Arc::clone(&exchanger))?);
        let writer = RecordWriter::new(sink, fetch.columns.clone());
        let fetcher = DataFetcher::new(http, fetch);
        let orchestrator = RequestOrchestrator::new(
            fetcher,
            exchanger,
            Arc::clone(&flow),
            writer,
            Arc::clone(&store),
        );

        Ok(Self {
            store,
            flow,
            orchestrator,
            presenter,
            run_lock: Mutex::new(()),
        })
    }

    /// The login flow, for wiring the callback listener.
    #[must_use]
    pub fn flow(&self) -> &AuthFlow<H> {
        &self.flow
    }

    /// The user this entry point acts for.
    #[must_use]
    pub fn user(&self) -> &str {
        self.store.user()
    }

    /// Fetches with the stored credential, or prompts for login when there
    /// is none. The outcome is also handed to the presenter.
    pub async fn trigger(&self) -> RunOutcome {
        let _guard = self.run_lock.lock().await;
        tracing::debug!(user = self.user(), "trigger");

        let outcome = match self.store.load().await {
            Ok(Some(credential)) => self.orchestrator.run(credential).await,
            Ok(None) => RunOutcome::LoggingIn(self.flow.login()),
            Err(e) => RunOutcome::Failed(RunFailure::Store(e)),
        };

        match &outcome {
            RunOutcome::Succeeded { .. } => {}
            RunOutcome::LoggingIn(prompt) => self.presenter.show_login(prompt),
            RunOutcome::Failed(failure) => self.presenter.show_error(&failure.to_string()),
        }
        outcome
    }

    /// Completes a login from the provider's redirect.
    pub async fn handle_callback(&self, params: &CallbackParams) -> CallbackPage {
        let _guard = self.run_lock.lock().await;
        let page = self.flow.handle_callback(params).await;
        if page.is_finished() {
            self.presenter.show_callback(&page);
        }
        page
    }

    /// Removes every stored credential value for the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be updated.
    pub async fn logout(&self) -> Result<(), StoreError> {
        let _guard = self.run_lock.lock().await;
        self.store.clear().await?;
        tracing::info!(user = self.user(), "logged out");
        Ok(())
    }
}
