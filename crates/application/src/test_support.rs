//! Hand-written port fakes shared by the unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::VecDeque;
use std::future::Future;

use async_trait::async_trait;
use forcepull_domain::{Credential, HttpRequest, HttpResponse, OAuthConfig};
use parking_lot::Mutex;
use serde_json::json;

use crate::auth::{CallbackPage, LoginPrompt};
use crate::ports::{HttpClient, HttpClientError, Presenter, RecordSink, SinkError};

pub const AUTHORIZE_URL: &str = "https://login.example.com/services/oauth2/authorize";
pub const TOKEN_URL: &str = "https://login.example.com/services/oauth2/token";

pub fn oauth_config() -> OAuthConfig {
    OAuthConfig::new("client-1", "secret-1", "http://localhost:8080/callback")
        .with_endpoints(AUTHORIZE_URL, TOKEN_URL)
}

pub fn seeded_credential() -> Credential {
    Credential::new(
        "https://na9.salesforce.com",
        "acc-1",
        Some("ref-1".to_string()),
    )
}

/// A query envelope with `(Name, Phone, Industry)` records.
pub fn account_page(rows: &[(&str, &str, &str)], next: Option<&str>) -> String {
    let records: Vec<_> = rows
        .iter()
        .map(|(name, phone, industry)| {
            json!({
                "attributes": {"type": "Account"},
                "Name": name,
                "Phone": phone,
                "Industry": industry,
            })
        })
        .collect();
    let mut page = json!({
        "totalSize": rows.len(),
        "done": next.is_none(),
        "records": records,
    });
    if let Some(url) = next {
        page["nextRecordsUrl"] = json!(url);
    }
    page.to_string()
}

type Scripted = Result<HttpResponse, HttpClientError>;

/// Answers token endpoint and data endpoint requests from two queues.
#[derive(Default)]
pub struct ScriptedHttpClient {
    token: Mutex<VecDeque<Scripted>>,
    data: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_token(&self, response: HttpResponse) {
        self.token.lock().push_back(Ok(response));
    }

    pub fn push_token_error(&self, error: HttpClientError) {
        self.token.lock().push_back(Err(error));
    }

    pub fn push_data(&self, response: HttpResponse) {
        self.data.lock().push_back(Ok(response));
    }

    pub fn push_data_error(&self, error: HttpClientError) {
        self.data.lock().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn token_calls(&self) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.url == TOKEN_URL)
            .count()
    }

    pub fn data_calls(&self) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.url != TOKEN_URL)
            .count()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn send(&self, request: &HttpRequest) -> impl Future<Output = Scripted> + Send {
        self.requests.lock().push(request.clone());
        let queue = if request.url == TOKEN_URL {
            &self.token
        } else {
            &self.data
        };
        let next = queue.lock().pop_front().unwrap_or_else(|| {
            Err(HttpClientError::Other(format!(
                "no scripted response for {}",
                request.url
            )))
        });
        async move { next }
    }
}

/// Collects appended rows.
#[derive(Default)]
pub struct RecordingSink {
    rows: Mutex<Vec<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().clone()
    }
}

#[async_trait]
impl RecordSink for RecordingSink {
    async fn append_row(&self, row: &[String]) -> Result<(), SinkError> {
        self.rows.lock().push(row.to_vec());
        Ok(())
    }
}

/// Collects everything shown to the user.
#[derive(Default)]
pub struct RecordingPresenter {
    logins: Mutex<Vec<LoginPrompt>>,
    callbacks: Mutex<Vec<CallbackPage>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logins(&self) -> Vec<LoginPrompt> {
        self.logins.lock().clone()
    }

    pub fn callbacks(&self) -> Vec<CallbackPage> {
        self.callbacks.lock().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}

impl Presenter for RecordingPresenter {
    fn show_login(&self, prompt: &LoginPrompt) {
        self.logins.lock().push(prompt.clone());
    }

    fn show_callback(&self, page: &CallbackPage) {
        self.callbacks.lock().push(page.clone());
    }

    fn show_error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }
}
