//! Fault handling and the JSON error envelope.
//!
//! Handlers (including every mounted sub-router) report failures as
//! [`ApiError`]. The error itself only records a [`Fault`] on the response;
//! [`error_envelope`] is the one place that renders faults to the client and
//! decides whether internal detail is shown. Panics are turned into faults by
//! [`panic_fault`] before they reach it. Plain-text failures produced by the
//! framework (body rejections, timeouts) are adopted as faults there too.

use std::any::Any;
use std::error::Error as StdError;

use axum::{
    body::{Body, HttpBody},
    extract::{Request, State},
    http::{header, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::http::response::ErrorEnvelope;
use crate::routing::PathPrefixMatcher;

/// Generic message used when a fault carries none.
pub const GENERIC_MESSAGE: &str = "Internal Server Error";

/// Largest plain-text error body read back when adopting it as a fault.
const ADOPTED_BODY_LIMIT: usize = 16 * 1024;

/// Error type for HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Service '{0}' is not available")]
    Unavailable(String),

    /// Any other status the handler wants to declare.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// Unexpected failure; reported as 500.
    #[error("{0}")]
    Internal(#[source] Box<dyn StdError + Send + Sync>),
}

impl ApiError {
    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        ApiError::Internal(err.into())
    }

    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            message: message.into(),
        }
    }

    /// HTTP status this error declares.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Status { status, .. } => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Unavailable(_) => "unavailable",
            ApiError::Status { .. } => "status",
            ApiError::Internal(_) => "internal",
        }
    }

    /// Convert into the fault recorded on the response.
    pub fn into_fault(self) -> Fault {
        let status = self.status();
        let message = self.to_string();

        let mut causes = Vec::new();
        let mut source = self.source();
        while let Some(err) = source {
            causes.push(err.to_string());
            source = err.source();
        }

        Fault {
            status,
            message,
            detail: json!({
                "kind": self.kind(),
                "status": status.as_u16(),
                "causes": causes,
            }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_fault().into_response()
    }
}

/// A failure recorded on a response, waiting to be rendered.
#[derive(Debug, Clone)]
pub struct Fault {
    pub status: StatusCode,
    pub message: String,
    pub detail: Value,
}

impl Fault {
    /// Render the client-facing envelope.
    pub fn render(&self, expose_detail: bool) -> Response {
        let message = if self.message.trim().is_empty() {
            GENERIC_MESSAGE.to_string()
        } else {
            self.message.clone()
        };
        let error = if expose_detail {
            self.detail.clone()
        } else {
            json!({})
        };

        let envelope = ErrorEnvelope::with_error(message, error);
        (self.status, Json(envelope)).into_response()
    }
}

impl IntoResponse for Fault {
    fn into_response(self) -> Response {
        // Suppressed rendering; the envelope middleware re-renders with the
        // deployment's exposure setting.
        let mut response = self.render(false);
        response.extensions_mut().insert(self);
        response
    }
}

/// Whether fault detail reaches clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultExposure {
    pub expose_detail: bool,
}

/// Central error handler: renders every recorded fault as the JSON envelope.
pub async fn error_envelope(
    State(exposure): State<FaultExposure>,
    uri: Uri,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let recorded = response.extensions_mut().remove::<Fault>();
    let fault = match recorded {
        Some(fault) => fault,
        None if should_adopt(uri.path(), &response) => {
            let (fault, original) = adopt(response).await;
            response = original;
            fault
        }
        None => return response,
    };

    tracing::error!(
        status = fault.status.as_u16(),
        path = %uri.path(),
        message = %fault.message,
        detail = %fault.detail,
        "Request failed"
    );

    let mut rendered = fault.render(exposure.expose_detail);
    // Keep headers set by inner layers (request id, cache hints).
    for (name, value) in response.headers() {
        if name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH {
            continue;
        }
        if !rendered.headers().contains_key(name) {
            rendered.headers_mut().insert(name.clone(), value.clone());
        }
    }
    rendered
}

/// Whether an unrecorded error response must still go out as the envelope.
///
/// Timeouts always qualify. Under `/api`, any non-JSON error does, except the
/// router's bodyless 404 for an unknown path.
fn should_adopt(path: &str, response: &Response) -> bool {
    let status = response.status();
    if status == StatusCode::REQUEST_TIMEOUT {
        return true;
    }
    if !(status.is_client_error() || status.is_server_error()) {
        return false;
    }
    if !PathPrefixMatcher::api().matches_path(path) || is_json(response) {
        return false;
    }
    !(status == StatusCode::NOT_FOUND && is_bodyless(response))
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

fn is_bodyless(response: &Response) -> bool {
    response.body().size_hint().exact() == Some(0)
}

/// Turn a plain error response into a fault carrying its status and text.
async fn adopt(response: Response) -> (Fault, Response) {
    let (parts, body) = response.into_parts();
    let status = parts.status;

    let text = axum::body::to_bytes(body, ADOPTED_BODY_LIMIT)
        .await
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default();

    let message = if !text.is_empty() {
        text
    } else {
        status.canonical_reason().unwrap_or(GENERIC_MESSAGE).to_string()
    };
    let kind = if status == StatusCode::REQUEST_TIMEOUT {
        "timeout"
    } else {
        "rejection"
    };

    let fault = Fault {
        status,
        message,
        detail: json!({ "kind": kind, "status": status.as_u16() }),
    };
    (fault, Response::from_parts(parts, Body::empty()))
}

/// `CatchPanicLayer` handler: turns a handler panic into a 500 fault.
pub fn panic_fault(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let panic_message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    Fault {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: GENERIC_MESSAGE.to_string(),
        detail: json!({ "kind": "panic", "panic": panic_message }),
    }
    .into_response()
}
