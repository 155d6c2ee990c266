use super::token::{Credential, CredentialStore, TokenResponse};
use crate::config::Config;
use crate::error::{auth_error, BotResult, Error};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

/// Scopes requested during authorization
pub const CALENDAR_SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar.readonly"];

pub const SUCCESS_PAGE: &str = "Authentication successful! You can close this window.";
pub const NO_CODE_PAGE: &str = "No authorization code found in the request";
pub const EMPTY_CODE_PAGE: &str = "No valid authorization code found in the request";
pub const STATE_MISMATCH_PAGE: &str = "Authorization state mismatch";

/// Result of one step of credential acquisition
#[derive(Debug)]
pub enum AuthOutcome {
    /// A usable credential is available
    CredentialFound(Credential),
    /// Nothing stored, interactive authorization is needed
    CredentialMissing,
    /// The interactive exchange did not produce a credential
    ExchangeFailed(Error),
}

impl AuthOutcome {
    pub fn into_result(self) -> BotResult<Credential> {
        match self {
            AuthOutcome::CredentialFound(credential) => Ok(credential),
            AuthOutcome::CredentialMissing => Err(auth_error("No credential available")),
            AuthOutcome::ExchangeFailed(e) => Err(e),
        }
    }
}

/// Produces a bearer credential for calendar access
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn acquire_credential(&self) -> BotResult<Credential>;
}

/// Classification of a request hitting the callback listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackRequest {
    Code(String),
    MissingCode,
    EmptyCode,
    StateMismatch,
}

impl CallbackRequest {
    /// Plaintext body sent back to the browser
    pub fn response_body(&self) -> &'static str {
        match self {
            CallbackRequest::Code(_) => SUCCESS_PAGE,
            CallbackRequest::MissingCode => NO_CODE_PAGE,
            CallbackRequest::EmptyCode => EMPTY_CODE_PAGE,
            CallbackRequest::StateMismatch => STATE_MISMATCH_PAGE,
        }
    }
}

/// Inspect the request target of a redirect, e.g. `/?code=...&state=...`
pub fn parse_callback(request_url: &str, expected_state: &str) -> CallbackRequest {
    let url = match Url::parse("http://localhost").and_then(|base| base.join(request_url)) {
        Ok(url) => url,
        Err(_) => return CallbackRequest::MissingCode,
    };

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            _ => {}
        }
    }

    match code {
        None => CallbackRequest::MissingCode,
        Some(code) if code.trim().is_empty() => CallbackRequest::EmptyCode,
        Some(code) => match state {
            Some(state) if state != expected_state => CallbackRequest::StateMismatch,
            _ => CallbackRequest::Code(code),
        },
    }
}

/// Short-lived HTTP listener that captures the authorization code
pub struct CallbackListener {
    server: Arc<tiny_http::Server>,
}

/// Wakes the blocking receive loop when the waiting future goes away
struct UnblockOnDrop(Arc<tiny_http::Server>);

impl Drop for UnblockOnDrop {
    fn drop(&mut self) {
        self.0.unblock();
    }
}

impl CallbackListener {
    pub fn bind(port: u16) -> BotResult<Self> {
        let server = tiny_http::Server::http(("0.0.0.0", port)).map_err(|e| {
            auth_error(&format!("Failed to bind callback listener on port {}: {}", port, e))
        })?;
        info!("Listening on port {}...", port);
        Ok(Self {
            server: Arc::new(server),
        })
    }

    /// Serve requests until a valid code arrives or `timeout` elapses.
    ///
    /// The listener is consumed and its socket closed on every return path,
    /// including cancellation of the returned future.
    pub async fn wait_for_code(self, expected_state: String, timeout: Duration) -> BotResult<String> {
        let _unblock = UnblockOnDrop(Arc::clone(&self.server));
        tokio::task::spawn_blocking(move || self.receive_code(&expected_state, timeout))
            .await
            .map_err(|e| auth_error(&format!("Callback listener task failed: {}", e)))?
    }

    fn receive_code(self, expected_state: &str, timeout: Duration) -> BotResult<String> {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            let request = match self.server.recv_timeout(remaining)? {
                Some(request) => request,
                None => break,
            };

            let outcome = parse_callback(request.url(), expected_state);
            let body = outcome.response_body();
            if !matches!(outcome, CallbackRequest::Code(_)) {
                debug!("Ignoring callback request: {}", body);
            }

            if let Err(e) = request.respond(tiny_http::Response::from_string(body)) {
                warn!("Failed to respond to callback request: {}", e);
            }

            if let CallbackRequest::Code(code) = outcome {
                return Ok(code);
            }
        }

        Err(auth_error(&format!(
            "Timed out after {}s waiting for the authorization redirect",
            timeout.as_secs()
        )))
    }
}

/// Google OAuth2 authorization-code flow backed by a credential store
pub struct GoogleAuth {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    port: u16,
    callback_timeout: Duration,
    auth_url: String,
    token_url: String,
    store: CredentialStore,
    client: Client,
    open_browser: bool,
}

impl GoogleAuth {
    pub fn new(config: &Config) -> Self {
        Self {
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_uri: config.redirect_uri(),
            port: config.oauth_port,
            callback_timeout: config.oauth_callback_timeout,
            auth_url: config.endpoints.google_auth_url.clone(),
            token_url: config.endpoints.google_token_url.clone(),
            store: CredentialStore::from_config(config),
            client: Client::new(),
            open_browser: false,
        }
    }

    /// Also try to open the consent page in a browser
    pub fn with_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    /// Consent URL with offline access and forced consent
    pub fn authorization_url(&self, state: &str) -> BotResult<Url> {
        let scope = CALENDAR_SCOPES.join(" ");
        Url::parse_with_params(
            &self.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("access_type", "offline"),
                ("scope", scope.as_str()),
                ("prompt", "consent"),
                ("state", state),
            ],
        )
        .map_err(|e| auth_error(&format!("Failed to build authorization URL: {}", e)))
    }

    /// Exchange an authorization code for a token pair
    pub async fn exchange_code(&self, code: &str) -> BotResult<Credential> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| auth_error(&format!("Failed to exchange authorization code: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(auth_error(&format!(
                "Failed to get token: HTTP {} - {}",
                status, error_body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

        Credential::from_token_response(token, Utc::now())
    }

    /// Run the consent, redirect and exchange steps
    pub async fn authorize_interactively(&self) -> AuthOutcome {
        match self.run_exchange().await {
            Ok(credential) => {
                info!("Authorization completed");
                AuthOutcome::CredentialFound(credential)
            }
            Err(e) => AuthOutcome::ExchangeFailed(e),
        }
    }

    async fn run_exchange(&self) -> BotResult<Credential> {
        let state = Uuid::new_v4().to_string();
        let url = self.authorization_url(&state)?;

        info!("Authorize this app by visiting this URL: {}", url);
        if self.open_browser {
            if let Err(e) = webbrowser::open(url.as_str()) {
                warn!("Failed to open browser: {}", e);
            }
        }

        let listener = CallbackListener::bind(self.port)?;
        info!("Waiting for authorization callback...");
        let code = listener.wait_for_code(state, self.callback_timeout).await?;

        let credential = self.exchange_code(&code).await?;
        self.store.save(&credential).await?;
        Ok(credential)
    }
}

#[async_trait]
impl AuthProvider for GoogleAuth {
    async fn acquire_credential(&self) -> BotResult<Credential> {
        match self.store.load().await {
            AuthOutcome::CredentialMissing => {
                info!("No stored credential, starting interactive authorization");
                self.authorize_interactively().await.into_result()
            }
            outcome => outcome.into_result(),
        }
    }
}
