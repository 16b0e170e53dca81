use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use super::transport::TransportError;

/// ErrorCategory
///
/// User-facing classification of a failed HTTP exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    BadRequest,
    SessionExpired,
    Forbidden,
    NotFound,
    Timeout,
    InternalError,
    NotImplemented,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
    HttpVersionNotSupported,
    /// Any other status; the raw message is surfaced unchanged.
    Unclassified,
}

impl ErrorCategory {
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest,
            401 => Self::SessionExpired,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            408 => Self::Timeout,
            500 => Self::InternalError,
            501 => Self::NotImplemented,
            502 => Self::BadGateway,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            505 => Self::HttpVersionNotSupported,
            _ => Self::Unclassified,
        }
    }

    /// describe
    ///
    /// The notification text for a failed response. `BadRequest` appends the server's
    /// `message` field when the body carries one.
    pub fn describe(&self, status: StatusCode, body: Option<&Value>) -> String {
        let text = match self {
            Self::BadRequest => {
                let detail = body
                    .and_then(|b| b.get("message"))
                    .and_then(Value::as_str);
                return match detail {
                    Some(detail) => format!("Bad request: {}", detail),
                    None => "Bad request".to_string(),
                };
            }
            Self::SessionExpired => "Session expired, please sign in again",
            Self::Forbidden => "Access denied",
            Self::NotFound => "Request address not found",
            Self::Timeout => "Request timed out",
            Self::InternalError => "Internal server error",
            Self::NotImplemented => "Service not implemented",
            Self::BadGateway => "Bad gateway",
            Self::ServiceUnavailable => "Service unavailable",
            Self::GatewayTimeout => "Gateway timeout",
            Self::HttpVersionNotSupported => "HTTP version not supported",
            Self::Unclassified => {
                return format!("Request failed with status code {}", status.as_u16());
            }
        };
        text.to_string()
    }
}

#[derive(Debug, Error)]
pub enum RequestError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Status {
        status: StatusCode,
        category: ErrorCategory,
        message: String,
        body: Option<Value>,
    },

    /// No answer at all: timeout, connection failure, malformed request.
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("response body could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RequestError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Status { category, .. } => Some(*category),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        self.category() == Some(ErrorCategory::SessionExpired)
    }
}
