// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the authenticated identity.
//!
//! ```rust,ignore
//! async fn user_info(Identity(identity): Identity) -> impl IntoResponse {
//!     identity.subject().to_string()
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::claims::IdentityContext;
use crate::error::AuthError;

/// The [`IdentityContext`] attached by `require_auth`.
///
/// Only usable on routes behind the middleware. Anywhere else it rejects with
/// `MissingAuth` rather than authenticating on its own.
#[derive(Debug, Clone)]
pub struct Identity(pub IdentityContext);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IdentityContext>()
            .cloned()
            .map(Identity)
            .ok_or_else(AuthError::missing_auth)
    }
}
