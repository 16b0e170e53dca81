use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Method, StatusCode, header::HeaderMap};
use std::{collections::VecDeque, sync::Arc, time::Duration};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("timeout of {0}ms exceeded")]
    Timeout(u128),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// OutgoingRequest
///
/// A fully merged request: baseline and caller config combined, interceptors applied.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub timeout: Duration,
    pub with_credentials: bool,
}

/// TransportResponse
///
/// Raw answer from the wire, before the response interceptor classifies it.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

// 1. Transport Contract
/// Transport
///
/// The seam between the request pipeline and the network. Swapping the concrete
/// implementation (`ReqwestTransport` in the shell, `MockTransport` in tests) leaves
/// interceptors and error translation untouched.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the request. Any HTTP status is a successful transport outcome;
    /// only failures to get an answer at all are errors.
    async fn execute(&self, request: OutgoingRequest) -> Result<TransportResponse, TransportError>;
}

/// TransportState
pub type TransportState = Arc<dyn Transport>;

// 2. The Real Implementation
/// ReqwestTransport
///
/// HTTP transport backed by `reqwest`. Two clients are kept so `with_credentials`
/// can be honoured per request: only one of them carries a cookie store.
#[derive(Clone)]
pub struct ReqwestTransport {
    with_cookies: reqwest::Client,
    without_cookies: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let with_cookies = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let without_cookies = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            with_cookies,
            without_cookies,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: OutgoingRequest) -> Result<TransportResponse, TransportError> {
        let client = if request.with_credentials {
            &self.with_cookies
        } else {
            &self.without_cookies
        };

        let timeout = request.timeout;
        let mut builder = client
            .request(request.method.clone(), &request.url)
            .headers(request.headers)
            .timeout(timeout);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        // GET and HEAD never carry a body.
        if let Some(body) = &request.body {
            if request.method != Method::GET && request.method != Method::HEAD {
                builder = builder.json(body);
            }
        }

        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                TransportError::Timeout(timeout.as_millis())
            } else if e.is_builder() {
                TransportError::InvalidRequest(e.to_string())
            } else {
                TransportError::Network(e.to_string())
            }
        };

        let response = builder.send().await.map_err(map_err)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(map_err)?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

// 3. The Mock Implementation (For Tests)
/// MockTransport
///
/// Records every request it receives and answers from a queue of scripted outcomes.
/// With an empty queue it answers `200 {}`.
#[derive(Default)]
pub struct MockTransport {
    outcomes: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: Mutex<Vec<OutgoingRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a JSON answer with the given status.
    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.outcomes.lock().push_back(Ok(TransportResponse {
            status,
            headers: HeaderMap::new(),
            body: body.to_string(),
        }));
    }

    /// Queues a transport-level failure.
    pub fn push_error(&self, error: TransportError) {
        self.outcomes.lock().push_back(Err(error));
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<OutgoingRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: OutgoingRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().push(request);
        self.outcomes.lock().pop_front().unwrap_or_else(|| {
            Ok(TransportResponse {
                status: StatusCode::OK,
                headers: HeaderMap::new(),
                body: "{}".to_string(),
            })
        })
    }
}
