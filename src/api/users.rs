// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Endpoints for authenticated users. Mounted behind `require_auth`.

use axum::extract::State;

use super::with_deadline;
use crate::auth::Identity;
use crate::error::{AuthError, ErrorBody};
use crate::models::{DataResponse, UserInfo};
use crate::state::AppState;

/// Check that the caller holds a valid access token.
#[utoipa::path(
    get,
    path = "/auth/protected",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Token accepted, wrapped in {status, data}", body = String),
        (status = 401, description = "Missing, malformed or invalid token", body = ErrorBody),
    )
)]
pub async fn protected(Identity(_identity): Identity) -> DataResponse<&'static str> {
    DataResponse::ok("Protected route")
}

/// Get the authenticated user's profile from the identity provider.
///
/// The caller's own access token is forwarded to the provider.
#[utoipa::path(
    get,
    path = "/auth/user/info",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User profile, wrapped in {status, data}", body = UserInfo),
        (status = 400, description = "Token rejected by the provider", body = ErrorBody),
        (status = 401, description = "Missing, malformed or invalid token", body = ErrorBody),
        (status = 503, description = "Identity provider unavailable", body = ErrorBody)
    )
)]
pub async fn user_info(
    State(state): State<AppState>,
    Identity(identity): Identity,
) -> Result<DataResponse<UserInfo>, AuthError> {
    let info = with_deadline(
        state.provider_timeout,
        "Unable to fetch user info",
        state.provider.get_user(identity.token()),
    )
    .await?;

    Ok(DataResponse::ok(info))
}
