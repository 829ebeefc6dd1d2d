// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::any::Any;
use std::future::Future;
use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::require_auth,
    error::{AuthError, ErrorBody},
    models::{ConfirmRequest, LoginRequest, LoginResponse, MessageResponse, SignUpRequest, UserInfo},
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod users;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/protected", get(users::protected))
        .route("/auth/user/info", get(users::user_info))
        .route_layer(from_fn_with_state(state.validator.clone(), require_auth));

    let routes = Router::new()
        .route("/ping", get(health::ping))
        .route("/health", get(health::health))
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/login", post(auth::login))
        .route("/auth/confirm", post(auth::confirm_account))
        .merge(protected)
        .with_state(state);

    with_layers(
        routes.merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi())),
    )
}

/// Request id, request tracing and panic recovery, outermost first.
fn with_layers(router: Router) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri().path(),
                request_id = %request_id,
            )
        })
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(trace)
            .layer(PropagateRequestIdLayer::new(request_id))
            .layer(CatchPanicLayer::custom(panic_response)),
    )
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Request handler panicked");
    AuthError::service_unavailable("").into_response()
}

/// Run a provider call under `timeout`. On expiry the call is dropped and
/// the caller gets `ServiceUnavailable` with `detail`.
pub(crate) async fn with_deadline<T>(
    timeout: Duration,
    detail: &str,
    call: impl Future<Output = Result<T, AuthError>>,
) -> Result<T, AuthError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                "Identity provider call timed out"
            );
            Err(AuthError::service_unavailable(detail))
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::ping,
        health::health,
        auth::sign_up,
        auth::login,
        auth::confirm_account,
        users::protected,
        users::user_info
    ),
    components(
        schemas(
            SignUpRequest,
            LoginRequest,
            ConfirmRequest,
            LoginResponse,
            MessageResponse,
            UserInfo,
            ErrorBody,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Auth", description = "Registration, login and confirmation"),
        (name = "Users", description = "Endpoints requiring a bearer token")
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
