// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity-provider account operations.
//!
//! Handlers only see [`IdentityProvider`] and the [`AuthError`] taxonomy.
//! Provider-specific failures ([`ProviderFailure`]) are classified inside the
//! implementation, once per operation.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::error::AuthError;
use crate::models::{ConfirmRequest, LoginRequest, LoginResponse, SignUpRequest, UserInfo};

pub mod cognito;

pub use cognito::CognitoClient;

/// Account operations forwarded to the identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new account. The email is the username.
    async fn sign_up(&self, request: &SignUpRequest) -> Result<(), AuthError>;

    /// Confirm an account with the emailed code.
    async fn confirm_account(&self, request: &ConfirmRequest) -> Result<(), AuthError>;

    /// Exchange email and password for tokens.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError>;

    /// Fetch the profile of the user owning `access_token`.
    async fn get_user(&self, access_token: &str) -> Result<UserInfo, AuthError>;
}

/// Raw outcome of a failed provider call, before classification.
#[derive(Debug, thiserror::Error)]
pub enum ProviderFailure {
    #[error("provider rejected request with {code}: {message}")]
    Rejected { code: String, message: String },

    #[error("provider returned HTTP {0} without an error code")]
    Status(StatusCode),

    #[error("provider request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("provider request could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("provider response was invalid: {0}")]
    InvalidResponse(String),
}

impl ProviderFailure {
    /// Upstream error code, e.g. `UsernameExistsException`.
    pub fn code(&self) -> Option<&str> {
        match self {
            ProviderFailure::Rejected { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Upstream error message, if the provider sent one.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            ProviderFailure::Rejected { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}
