//! Request Pipeline
//!
//! Every call the console makes to its API goes through `RequestPipeline::send`:
//! caller config is merged over the baseline, the current bearer token is attached,
//! and failures are classified, announced to the shell and returned to the caller.

use reqwest::{
    Method, StatusCode,
    header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{sync::Arc, time::Duration};

use crate::{
    config::ClientConfig,
    events::{ReloadReason, ShellEvents},
    registrar::ResetOutcome,
    session::Session,
};

pub mod error;
pub mod transport;

pub use error::{ErrorCategory, RequestError};
pub use transport::{
    MockTransport, OutgoingRequest, ReqwestTransport, Transport, TransportError,
    TransportResponse, TransportState,
};

/// RequestSpec
///
/// Caller-supplied request config. Every `Option` left as `None` falls back to the
/// pipeline baseline; anything set here wins.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    /// Relative to the base address, or absolute (`http://`/`https://`).
    pub url: String,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
    pub base_url: Option<String>,
    pub with_credentials: Option<bool>,
}

impl RequestSpec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
            timeout: None,
            base_url: None,
            with_credentials: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_credentials(mut self, with_credentials: bool) -> Self {
        self.with_credentials = Some(with_credentials);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// RequestDefaults
///
/// The baseline every request starts from: base address, timeout, cookie policy and
/// an empty JSON object as body.
#[derive(Debug, Clone)]
pub struct RequestDefaults {
    pub base_url: String,
    pub timeout: Duration,
    pub with_credentials: bool,
    pub body: Value,
}

impl RequestDefaults {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_api.clone(),
            timeout: config.timeout,
            with_credentials: config.with_credentials,
            body: Value::Object(Default::default()),
        }
    }

    /// merge
    ///
    /// Overlays the caller's spec onto the baseline. Never the other way round.
    pub fn merge(&self, spec: RequestSpec) -> OutgoingRequest {
        let base_url = spec.base_url.as_deref().unwrap_or(&self.base_url);
        let url = if spec.url.starts_with("http://") || spec.url.starts_with("https://") {
            spec.url.clone()
        } else {
            format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                spec.url.trim_start_matches('/')
            )
        };

        OutgoingRequest {
            method: spec.method,
            url,
            headers: spec.headers,
            query: spec.query,
            body: Some(spec.body.unwrap_or_else(|| self.body.clone())),
            timeout: spec.timeout.unwrap_or(self.timeout),
            with_credentials: spec.with_credentials.unwrap_or(self.with_credentials),
        }
    }
}

/// ApiResponse
///
/// A successful (2xx) answer, passed through unchanged.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RequestError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// RequestPipeline
///
/// Request phase → transport → response phase, strictly in that order per request.
/// Concurrent requests are independent; two of them may both see a 401, which is why
/// session logout is idempotent.
pub struct RequestPipeline {
    transport: TransportState,
    session: Arc<Session>,
    events: ShellEvents,
    defaults: RequestDefaults,
}

impl RequestPipeline {
    pub fn new(
        transport: TransportState,
        session: Arc<Session>,
        events: ShellEvents,
        defaults: RequestDefaults,
    ) -> Self {
        Self {
            transport,
            session,
            events,
            defaults,
        }
    }

    pub fn defaults(&self) -> &RequestDefaults {
        &self.defaults
    }

    /// send
    ///
    /// Sends one request. Non-2xx answers and transport failures are announced to the
    /// shell and returned as `Err`; nothing is swallowed.
    pub async fn send(&self, spec: RequestSpec) -> Result<ApiResponse, RequestError> {
        let request = self.intercept_request(self.defaults.merge(spec))?;

        tracing::debug!(method = %request.method, url = %request.url, "Sending request");
        let outcome = self.transport.execute(request).await;

        self.intercept_response(outcome)
    }

    /// GET `url` and decode the JSON answer.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RequestError> {
        self.send(RequestSpec::get(url)).await?.json()
    }

    /// POST `body` as JSON to `url` and decode the JSON answer.
    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        self.send(RequestSpec::post(url).json(body)).await?.json()
    }

    // The token is read here, at send time, so a rotated credential applies immediately.
    fn intercept_request(&self, mut request: OutgoingRequest) -> Result<OutgoingRequest, RequestError> {
        match self.session.token() {
            Some(token) => {
                let value = match HeaderValue::from_str(&format!("Bearer {}", token)) {
                    Ok(value) => value,
                    Err(e) => {
                        let e = TransportError::InvalidRequest(e.to_string());
                        tracing::warn!(error = %e, "Stored credential is not a valid header value");
                        self.events.notify(e.to_string());
                        return Err(e.into());
                    }
                };
                request.headers.insert(AUTHORIZATION, value);
            }
            None => tracing::debug!(url = %request.url, "No credential stored, sending anonymously"),
        }
        Ok(request)
    }

    fn intercept_response(
        &self,
        outcome: Result<TransportResponse, TransportError>,
    ) -> Result<ApiResponse, RequestError> {
        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Request failed before a response arrived");
                self.events.notify(e.to_string());
                return Err(e.into());
            }
        };

        if response.status.is_success() {
            return Ok(ApiResponse {
                status: response.status,
                headers: response.headers,
                body: response.body,
            });
        }

        let status = response.status;
        let category = ErrorCategory::from_status(status);
        let body = serde_json::from_str::<Value>(&response.body).ok();
        let message = category.describe(status, body.as_ref());

        tracing::warn!(status = status.as_u16(), ?category, %message, "Request rejected");

        if category == ErrorCategory::SessionExpired {
            // Stale in-memory state cannot be trusted after an auth failure. A failed
            // route reset has already asked for the reload.
            if self.session.sign_out() != Some(ResetOutcome::ReloadRequested) {
                self.events.request_reload(ReloadReason::SessionExpired);
            }
        }
        self.events.notify(message.clone());

        Err(RequestError::Status {
            status,
            category,
            message,
            body,
        })
    }
}
