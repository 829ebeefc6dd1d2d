// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error taxonomy shared by the token pipeline and the provider forwarders.
//!
//! Every failure that reaches the HTTP boundary is an [`AuthError`]. The set of
//! kinds is closed: each kind has a fixed status code and a default message that
//! is safe to show to callers. A detail may be appended when it cannot leak
//! provider internals (for example "Account not confirmed").
//!
//! | Kind | Status | Default message |
//! |------|--------|-----------------|
//! | `MissingAuth` | 401 | Authorization header required |
//! | `MalformedAuth` | 401 | Invalid authorization header format |
//! | `InvalidToken` | 401 | Invalid authorization token |
//! | `InvalidCredentials` | 401 | Invalid credentials |
//! | `InvalidInput` | 400 | Invalid input |
//! | `AccountExists` | 409 | Account already exists |
//! | `PasswordResetRequired` | 401 | Password reset required |
//! | `InvalidCode` | 400 | Invalid confirmation code |
//! | `ExpiredCode` | 400 | Confirmation code has expired |
//! | `ServiceUnavailable` | 503 | Service unavailable |

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Stable classification of an [`AuthError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorKind {
    MissingAuth,
    MalformedAuth,
    InvalidToken,
    InvalidCredentials,
    InvalidInput,
    AccountExists,
    PasswordResetRequired,
    InvalidCode,
    ExpiredCode,
    ServiceUnavailable,
}

impl AuthErrorKind {
    /// HTTP status code for this kind.
    pub fn status_code(self) -> StatusCode {
        match self {
            AuthErrorKind::MissingAuth
            | AuthErrorKind::MalformedAuth
            | AuthErrorKind::InvalidToken
            | AuthErrorKind::InvalidCredentials
            | AuthErrorKind::PasswordResetRequired => StatusCode::UNAUTHORIZED,
            AuthErrorKind::InvalidInput | AuthErrorKind::InvalidCode | AuthErrorKind::ExpiredCode => {
                StatusCode::BAD_REQUEST
            }
            AuthErrorKind::AccountExists => StatusCode::CONFLICT,
            AuthErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Caller-safe message used when no detail is attached.
    pub fn default_message(self) -> &'static str {
        match self {
            AuthErrorKind::MissingAuth => "Authorization header required",
            AuthErrorKind::MalformedAuth => "Invalid authorization header format",
            AuthErrorKind::InvalidToken => "Invalid authorization token",
            AuthErrorKind::InvalidCredentials => "Invalid credentials",
            AuthErrorKind::InvalidInput => "Invalid input",
            AuthErrorKind::AccountExists => "Account already exists",
            AuthErrorKind::PasswordResetRequired => "Password reset required",
            AuthErrorKind::InvalidCode => "Invalid confirmation code",
            AuthErrorKind::ExpiredCode => "Confirmation code has expired",
            AuthErrorKind::ServiceUnavailable => "Service unavailable",
        }
    }

    /// Machine-readable code, used as a log field.
    pub fn code(self) -> &'static str {
        match self {
            AuthErrorKind::MissingAuth => "missing_auth",
            AuthErrorKind::MalformedAuth => "malformed_auth",
            AuthErrorKind::InvalidToken => "invalid_token",
            AuthErrorKind::InvalidCredentials => "invalid_credentials",
            AuthErrorKind::InvalidInput => "invalid_input",
            AuthErrorKind::AccountExists => "account_exists",
            AuthErrorKind::PasswordResetRequired => "password_reset_required",
            AuthErrorKind::InvalidCode => "invalid_code",
            AuthErrorKind::ExpiredCode => "expired_code",
            AuthErrorKind::ServiceUnavailable => "service_unavailable",
        }
    }

    /// RFC 6750 challenge for bearer-token failures.
    fn bearer_challenge(self) -> Option<&'static str> {
        match self {
            AuthErrorKind::MissingAuth => Some("Bearer"),
            AuthErrorKind::MalformedAuth => Some("Bearer error=\"invalid_request\""),
            AuthErrorKind::InvalidToken => Some("Bearer error=\"invalid_token\""),
            _ => None,
        }
    }
}

/// A classified, caller-safe failure.
///
/// Immutable once built. The rendered message is the kind's default message,
/// optionally followed by `": <detail>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthError {
    kind: AuthErrorKind,
    detail: Option<String>,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind) -> Self {
        Self { kind, detail: None }
    }

    /// Attach a detail to the default message. Empty details are dropped.
    pub fn with_detail(kind: AuthErrorKind, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            kind,
            detail: (!detail.trim().is_empty()).then_some(detail),
        }
    }

    pub fn missing_auth() -> Self {
        Self::new(AuthErrorKind::MissingAuth)
    }

    pub fn malformed_auth() -> Self {
        Self::new(AuthErrorKind::MalformedAuth)
    }

    pub fn invalid_token() -> Self {
        Self::new(AuthErrorKind::InvalidToken)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(AuthErrorKind::InvalidCredentials)
    }

    pub fn invalid_input(detail: impl Into<String>) -> Self {
        Self::with_detail(AuthErrorKind::InvalidInput, detail)
    }

    pub fn account_exists() -> Self {
        Self::new(AuthErrorKind::AccountExists)
    }

    pub fn password_reset_required() -> Self {
        Self::new(AuthErrorKind::PasswordResetRequired)
    }

    pub fn invalid_code() -> Self {
        Self::new(AuthErrorKind::InvalidCode)
    }

    pub fn expired_code() -> Self {
        Self::new(AuthErrorKind::ExpiredCode)
    }

    pub fn service_unavailable(detail: impl Into<String>) -> Self {
        Self::with_detail(AuthErrorKind::ServiceUnavailable, detail)
    }

    pub fn kind(&self) -> AuthErrorKind {
        self.kind
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }

    /// Message returned to the caller.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind.default_message())?;
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AuthError {}

/// JSON body for every failed request: `{"status": 401, "error": "..."}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub status: u16,
    pub error: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorBody {
            status: status.as_u16(),
            error: self.message(),
        });

        let mut response = (status, body).into_response();
        if let Some(challenge) = self.kind.bearer_challenge() {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static(challenge));
        }
        response
    }
}
