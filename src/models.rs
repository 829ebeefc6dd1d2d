// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the HTTP API. Request types derive
//! `Deserialize` and `ToSchema`; response payloads derive `Serialize` and
//! `ToSchema`.
//!
//! Every successful response is wrapped in a [`DataResponse`] envelope:
//!
//! ```json
//! {"status": 200, "data": {"access_token": "...", "refresh_token": "...", "expires_in": 3600}}
//! ```

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AuthError;

// =============================================================================
// Response Envelope
// =============================================================================

/// Success envelope: `{"status": <code>, "data": <payload>}`.
///
/// The HTTP status of the response always equals `status`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DataResponse<T> {
    pub status: u16,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        Self {
            status: status.as_u16(),
            data,
        }
    }

    pub fn ok(data: T) -> Self {
        Self::new(StatusCode::OK, data)
    }

    pub fn created(data: T) -> Self {
        Self::new(StatusCode::CREATED, data)
    }
}

impl<T: Serialize> IntoResponse for DataResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Plain confirmation message payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Account Requests
// =============================================================================

/// Registration request. The email doubles as the provider username.
#[derive(Clone, Deserialize, ToSchema)]
pub struct SignUpRequest {
    /// Display name stored as the `name` attribute.
    pub name: String,
    pub email: String,
    pub password: String,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        require("password", &self.password)
    }
}

/// Login request.
#[derive(Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        require("email", &self.email)?;
        require("password", &self.password)
    }
}

/// Email confirmation request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ConfirmRequest {
    pub email: String,
    /// Code delivered to the user's email address.
    pub code: String,
}

impl ConfirmRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        require("email", &self.email)?;
        require("code", &self.code)
    }
}

fn require(field: &str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::invalid_input(format!("{field} is required")));
    }
    Ok(())
}

impl std::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Account Responses
// =============================================================================

/// Tokens issued by the identity provider after a successful login.
#[derive(Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Profile of the authenticated user as stored by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserInfo {
    pub username: String,
    /// Provider attributes by name (`email`, `name`, `sub`, ...).
    pub attributes: BTreeMap<String, String>,
}
