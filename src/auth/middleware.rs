// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer-token gate for protected routes.
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/auth/protected", get(protected))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         validator.clone(),
//!         require_auth,
//!     ));
//! ```
//!
//! On success the request carries exactly one [`IdentityContext`] extension,
//! read by handlers through [`Identity`](super::Identity). On failure the
//! wrapped handler never runs.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use super::claims::IdentityContext;
use super::validator::TokenValidator;
use crate::error::AuthError;

/// Authenticate the request and attach its identity.
pub async fn require_auth(
    State(validator): State<Arc<TokenValidator>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = authenticate(&validator, request.headers()).inspect_err(|err| {
        tracing::debug!(
            kind = err.kind().code(),
            path = %request.uri().path(),
            "Rejected unauthenticated request"
        );
    })?;

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

fn authenticate(
    validator: &TokenValidator,
    headers: &HeaderMap,
) -> Result<IdentityContext, AuthError> {
    let token = bearer_token(headers)?;
    let claims = validator.validate(token)?;
    Ok(IdentityContext::new(claims, token.to_owned()))
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// A blank header counts as missing. Otherwise it
/// must be exactly the scheme, one space and a non-empty token.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(AuthError::missing_auth)?
        .to_str()
        .map_err(|_| AuthError::malformed_auth())?;

    if value.trim().is_empty() {
        return Err(AuthError::missing_auth());
    }

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::malformed_auth()),
    }
}
