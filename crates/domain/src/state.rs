//! Request orchestration state types.
//!
//! This module defines the state machine driven for each data request:
//! `Idle -> Fetching -> {Succeeded, RefreshingThenRetry, LoggingIn, FatalError}`.

use crate::http::HttpResponse;
use crate::record::QueryEnvelope;

/// Stage of a single orchestrated run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrchestratorState {
    /// Nothing issued yet.
    #[default]
    Idle,
    /// A data request is in flight.
    Fetching,
    /// The access token was rejected; refreshing before the single retry.
    RefreshingThenRetry,
    /// Records were accepted and written.
    Succeeded,
    /// The refresh token is unusable; the user must authorize again.
    LoggingIn,
    /// The run ended with a user-visible failure.
    FatalError,
}

impl OrchestratorState {
    /// Returns true once the run can no longer change state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::LoggingIn | Self::FatalError)
    }

    /// Short name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::RefreshingThenRetry => "refreshing_then_retry",
            Self::Succeeded => "succeeded",
            Self::LoggingIn => "logging_in",
            Self::FatalError => "fatal_error",
        }
    }
}

impl std::fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Classification of one data endpoint response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Status below 300 with a parseable envelope.
    Success(QueryEnvelope),
    /// Status 401.
    AuthExpired,
    /// Anything else, surfaced verbatim.
    TransientError {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },
}

impl FetchOutcome {
    /// Classifies a data endpoint response.
    ///
    /// A success status whose body is not an envelope is reported as a
    /// `TransientError` carrying the original status and body.
    #[must_use]
    pub fn classify(response: &HttpResponse) -> Self {
        if response.is_unauthorized() {
            return Self::AuthExpired;
        }
        if response.is_success() {
            if let Ok(envelope) = QueryEnvelope::parse(&response.body) {
                return Self::Success(envelope);
            }
        }
        Self::TransientError {
            status: response.status,
            body: response.body.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!OrchestratorState::Idle.is_terminal());
        assert!(!OrchestratorState::Fetching.is_terminal());
        assert!(!OrchestratorState::RefreshingThenRetry.is_terminal());
        assert!(OrchestratorState::Succeeded.is_terminal());
        assert!(OrchestratorState::LoggingIn.is_terminal());
        assert!(OrchestratorState::FatalError.is_terminal());
    }

    #[test]
    fn test_classify_success() {
        let outcome = FetchOutcome::classify(&HttpResponse::new(
            200,
            r#"{"totalSize":0,"done":true,"records":[]}"#,
        ));
        assert!(matches!(outcome, FetchOutcome::Success(e) if e.records.is_empty()));
    }

    #[test]
    fn test_classify_unauthorized() {
        let outcome = FetchOutcome::classify(&HttpResponse::new(
            401,
            r#"[{"message":"Session expired or invalid","errorCode":"INVALID_SESSION_ID"}]"#,
        ));
        assert_eq!(outcome, FetchOutcome::AuthExpired);
    }

    #[test]
    fn test_classify_other_statuses_keep_body() {
        for status in [302, 400, 403, 404, 500, 503] {
            let outcome = FetchOutcome::classify(&HttpResponse::new(status, "nope"));
            assert_eq!(
                outcome,
                FetchOutcome::TransientError {
                    status,
                    body: "nope".to_string()
                }
            );
        }
    }

    #[test]
    fn test_classify_unparseable_success_body() {
        let outcome = FetchOutcome::classify(&HttpResponse::new(200, "<html/>"));
        assert_eq!(
            outcome,
            FetchOutcome::TransientError {
                status: 200,
                body: "<html/>".to_string()
            }
        );
    }
}
