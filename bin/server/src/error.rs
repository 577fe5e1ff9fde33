//! The server's error type and its mapping onto HTTP responses.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::fmt;

use gatehouse_provider::ProviderError;
use gatehouse_session::SessionError;

/// Errors surfaced by the auth flow and the static server.
///
/// `NotFound`-kind misses never reach this type: they are handled locally
/// by fallback chains (next handler, SPA index). Everything here is a
/// terminal outcome for the request.
#[derive(Debug)]
pub enum AppError {
    /// Identity provider lookup or exchange failure.
    Provider(ProviderError),
    /// CSRF state check failed on the callback.
    StateMismatch,
    /// The callback arrived without a stored login attempt.
    NoLoginInProgress,
    /// The session cookie could not be written back.
    Session(SessionError),
    /// Malformed request (undecodable path, unreadable form body).
    InvalidRequest { details: String },
    /// Non-GET/HEAD request for a static resource.
    MethodNotAllowed,
    /// Filesystem error other than not-found.
    Io(std::io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider(err) => write!(f, "identity provider error: {}", err),
            Self::StateMismatch => write!(f, "state token mismatch"),
            Self::NoLoginInProgress => {
                write!(f, "callback received without a login in progress")
            }
            Self::Session(err) => write!(f, "session error: {}", err),
            Self::InvalidRequest { details } => write!(f, "invalid request: {}", details),
            Self::MethodNotAllowed => write!(f, "method not allowed"),
            Self::Io(err) => write!(f, "filesystem error: {}", err),
        }
    }
}

impl std::error::Error for AppError {}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Provider(err) => match err {
                ProviderError::UnknownProvider { .. }
                | ProviderError::MissingCode
                | ProviderError::Marshal { .. }
                | ProviderError::InvalidAuthUrl { .. } => {
                    (StatusCode::BAD_REQUEST, "Authentication request invalid").into_response()
                }
                other => {
                    tracing::error!(error = %other, "identity provider failure");
                    (StatusCode::BAD_GATEWAY, "Authentication failed").into_response()
                }
            },
            Self::StateMismatch => {
                (StatusCode::BAD_REQUEST, "State token mismatch").into_response()
            }
            Self::NoLoginInProgress => {
                (StatusCode::BAD_REQUEST, "No login in progress").into_response()
            }
            Self::Session(err) => {
                tracing::error!(error = %err, "session failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            Self::InvalidRequest { details } => {
                (StatusCode::BAD_REQUEST, details).into_response()
            }
            Self::MethodNotAllowed => {
                let mut response = StatusCode::METHOD_NOT_ALLOWED.into_response();
                response
                    .headers_mut()
                    .insert(header::ALLOW, HeaderValue::from_static("GET, HEAD"));
                response
            }
            Self::Io(err) => {
                tracing::error!(error = %err, "filesystem failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_mismatch_maps_to_bad_request() {
        let response = AppError::StateMismatch.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn method_not_allowed_advertises_allowed_methods() {
        let response = AppError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get(header::ALLOW).map(|v| v.as_bytes()),
            Some(&b"GET, HEAD"[..])
        );
    }

    #[test]
    fn exchange_failure_maps_to_bad_gateway() {
        let response = AppError::Provider(ProviderError::TokenExchange {
            details: "boom".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
