//! Forcepull - wiring for the command line binary
//!
//! Builds the entry point from loaded settings and drives one trigger,
//! including the local login round trip when no credential is stored.

use std::sync::Arc;

use forcepull_application::ports::{Presenter, RecordSink};
use forcepull_application::{
    ApplicationError, CallbackPage, EntryPoint, HttpClientError, RunOutcome, StoreError,
};
use forcepull_infrastructure::{
    CallbackError, CallbackListener, ConsolePresenter, ConsoleTableSink, FileCredentialStore,
    ReqwestHttpClient, Settings, SettingsError, TokioFileSystem, TsvFileSink,
};
use thiserror::Error;

/// Errors that stop the binary before a run outcome exists.
#[derive(Debug, Error)]
pub enum AppError {
    /// Settings could not be loaded or are invalid.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Components could not be wired.
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] HttpClientError),

    /// The callback listener failed or timed out.
    #[error(transparent)]
    Callback(#[from] CallbackError),

    /// The credential store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The provider redirect reported a failed login.
    #[error("Login failed: {0}")]
    LoginFailed(String),
}

/// Wires every adapter named by `settings` into an entry point.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built, no credential path
/// is available, or the configuration is rejected.
pub fn build_entry_point(settings: &Settings) -> Result<EntryPoint<ReqwestHttpClient>, AppError> {
    build_entry_point_with(settings, Arc::new(ConsolePresenter::stderr()))
}

/// Like [`build_entry_point`] with a caller-supplied presenter.
///
/// # Errors
///
/// See [`build_entry_point`].
pub fn build_entry_point_with(
    settings: &Settings,
    presenter: Arc<dyn Presenter>,
) -> Result<EntryPoint<ReqwestHttpClient>, AppError> {
    let http = Arc::new(ReqwestHttpClient::with_timeout(settings.http_timeout())?);
    let store = Arc::new(FileCredentialStore::new(
        TokioFileSystem::new(),
        settings.credential_path()?,
        settings.user.clone(),
    ));

    let header = settings.fetch.columns.clone();
    let sink: Arc<dyn RecordSink> = match &settings.output.tsv_path {
        Some(path) => Arc::new(TsvFileSink::new(TokioFileSystem::new(), path, header)),
        None => Arc::new(ConsoleTableSink::stdout(header)),
    };

    Ok(EntryPoint::new(
        settings.oauth.clone(),
        settings.fetch.clone(),
        http,
        store,
        sink,
        presenter,
    )?)
}

/// Runs one trigger. If a login is needed, serves the redirect once and
/// triggers again with the new credential.
///
/// # Errors
///
/// Returns an error if wiring fails, the listener cannot bind or times
/// out, or the provider reports a failed login.
pub async fn run(settings: &Settings) -> Result<RunOutcome, AppError> {
    let entry = build_entry_point(settings)?;
    run_with(&entry, settings).await
}

/// [`run`] against an already wired entry point.
///
/// # Errors
///
/// See [`run`].
pub async fn run_with(
    entry: &EntryPoint<ReqwestHttpClient>,
    settings: &Settings,
) -> Result<RunOutcome, AppError> {
    let outcome = entry.trigger().await;
    let RunOutcome::LoggingIn(_) = outcome else {
        return Ok(outcome);
    };

    let listener =
        CallbackListener::bind(entry.flow().redirect_url(), settings.callback_timeout()).await?;
    let page = listener
        .serve_once(|params| async move { entry.handle_callback(&params).await })
        .await?;

    match page {
        CallbackPage::Completed { .. } => {
            tracing::info!(user = entry.user(), "login completed, fetching");
            Ok(entry.trigger().await)
        }
        CallbackPage::Failed { error } => Err(AppError::LoginFailed(error)),
        CallbackPage::Ignored => Ok(outcome),
    }
}

/// Clears the stored credential of the configured user.
///
/// # Errors
///
/// Returns an error if wiring fails or the store cannot be updated.
pub async fn logout(settings: &Settings) -> Result<(), AppError> {
    build_entry_point(settings)?.logout().await?;
    Ok(())
}
