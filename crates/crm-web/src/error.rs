use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use std::fmt::{self, Display};

/// The closed set of error kinds an HTTP handler may answer with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    TooManyRequests,
    InternalServerError,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::Conflict => "Conflict",
            Self::TooManyRequests => "Too Many Requests",
            Self::InternalServerError => "Internal Server Error",
        }
    }
}

/// An error rendered as `{ "message": ..., ...meta }` with the kind's status code.
///
/// `meta` is sent to the client; `log` is only ever written to the log.
#[derive(Debug)]
pub struct ApiError {
    kind: ErrorKind,
    message: Option<String>,
    meta: Map<String, Value>,
    log: Option<String>,
}

impl ApiError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            meta: Map::new(),
            log: None,
        }
    }

    /// An internal error whose cause is logged but never rendered.
    pub fn internal(cause: impl Display) -> Self {
        Self::new(ErrorKind::InternalServerError).with_log(cause)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// A `value` that cannot be serialized is logged and left out of the body.
    pub fn with_meta(mut self, key: &str, value: impl serde::Serialize) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => {
                self.meta.insert(key.to_owned(), value);
            }
            Err(err) => tracing::warn!(key, "dropping unserializable error meta: {err}"),
        }
        self
    }

    pub fn with_log(mut self, cause: impl Display) -> Self {
        self.log = Some(cause.to_string());
        self
    }

    pub fn message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| self.kind.default_message())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.kind.status();
        let log = self.log.as_deref().unwrap_or_default();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), cause = log, "{}", self.message());
        } else {
            tracing::warn!(status = status.as_u16(), cause = log, "{}", self.message());
        }
        let mut body = Map::new();
        body.insert("message".to_owned(), Value::String(self.message().to_owned()));
        body.extend(self.meta);
        (status, Json(Value::Object(body))).into_response()
    }
}
