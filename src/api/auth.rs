// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account endpoints: registration, login and email confirmation.
//!
//! Thin forwarders to the identity provider. Each call is bounded by the
//! configured provider deadline.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use super::with_deadline;
use crate::error::{AuthError, ErrorBody};
use crate::models::{
    ConfirmRequest, DataResponse, LoginRequest, LoginResponse, MessageResponse, SignUpRequest,
};
use crate::state::AppState;

/// Map an unreadable JSON body to `InvalidInput`.
fn bad_body(rejection: JsonRejection) -> AuthError {
    tracing::debug!(error = %rejection.body_text(), "Rejected request body");
    AuthError::invalid_input("Please provide correct input")
}

/// Register a new account.
///
/// The provider emails a confirmation code to the given address.
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "Auth",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account registered, wrapped in {status, data}", body = MessageResponse),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 409, description = "Account already exists", body = ErrorBody),
        (status = 503, description = "Identity provider unavailable", body = ErrorBody)
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<DataResponse<MessageResponse>, AuthError> {
    let Json(request) = payload.map_err(bad_body)?;
    request.validate()?;

    with_deadline(
        state.provider_timeout,
        "Unable to process registration",
        state.provider.sign_up(&request),
    )
    .await?;

    Ok(DataResponse::created(MessageResponse::new(
        "User registered successfully.",
    )))
}

/// Log in with email and password.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Tokens issued, wrapped in {status, data}", body = LoginResponse),
        (status = 400, description = "Invalid input or account not confirmed", body = ErrorBody),
        (status = 401, description = "Invalid credentials or password reset required", body = ErrorBody),
        (status = 503, description = "Identity provider unavailable", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<DataResponse<LoginResponse>, AuthError> {
    let Json(request) = payload.map_err(bad_body)?;
    request.validate()?;

    let tokens = with_deadline(
        state.provider_timeout,
        "Authentication service unavailable",
        state.provider.login(&request),
    )
    .await?;

    Ok(DataResponse::ok(tokens))
}

/// Confirm an account with the emailed code.
#[utoipa::path(
    post,
    path = "/auth/confirm",
    tag = "Auth",
    request_body = ConfirmRequest,
    responses(
        (status = 200, description = "Account confirmed, wrapped in {status, data}", body = MessageResponse),
        (status = 400, description = "Invalid or expired code", body = ErrorBody),
        (status = 503, description = "Identity provider unavailable", body = ErrorBody)
    )
)]
pub async fn confirm_account(
    State(state): State<AppState>,
    payload: Result<Json<ConfirmRequest>, JsonRejection>,
) -> Result<DataResponse<MessageResponse>, AuthError> {
    let Json(request) = payload.map_err(bad_body)?;
    request.validate()?;

    with_deadline(
        state.provider_timeout,
        "Unable to confirm account",
        state.provider.confirm_account(&request),
    )
    .await?;

    Ok(DataResponse::ok(MessageResponse::new(
        "Account confirmed successfully.",
    )))
}
