// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Amazon Cognito user-pool client.
//!
//! Talks to the user-pool JSON API directly: every action is a `POST /` with
//! an `X-Amz-Target` header naming the action. The four actions used here are
//! public app-client actions and need no request signing.
//!
//! When the app client has a secret, each call that names a user carries
//! `SecretHash = base64(HMAC-SHA256(secret, username + client_id))`.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::{IdentityProvider, ProviderFailure};
use crate::error::AuthError;
use crate::models::{ConfirmRequest, LoginRequest, LoginResponse, SignUpRequest, UserInfo};

type HmacSha256 = Hmac<Sha256>;

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const AMZ_JSON: &str = "application/x-amz-json-1.1";
const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";
const USER_PASSWORD_AUTH: &str = "USER_PASSWORD_AUTH";

/// Cognito user-pool app client.
#[derive(Clone)]
pub struct CognitoClient {
    endpoint: String,
    client_id: String,
    /// HMAC keyed with the client secret, if the app client has one.
    secret: Option<HmacSha256>,
    http: reqwest::Client,
}

impl std::fmt::Debug for CognitoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CognitoClient")
            .field("endpoint", &self.endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl CognitoClient {
    /// `http` should carry the per-call timeout.
    pub fn new(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: Option<&str>,
    ) -> Self {
        // HMAC accepts keys of any length, so keying cannot fail.
        let secret = client_secret.and_then(|s| HmacSha256::new_from_slice(s.as_bytes()).ok());

        Self {
            endpoint: endpoint.into(),
            client_id: client_id.into(),
            secret,
            http,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `SecretHash` for `username`, or `None` without a client secret.
    pub fn secret_hash(&self, username: &str) -> Option<String> {
        let mut mac = self.secret.clone()?;
        mac.update(username.as_bytes());
        mac.update(self.client_id.as_bytes());
        Some(Base64::encode_string(&mac.finalize().into_bytes()))
    }

    async fn call<I, O>(&self, action: &str, input: &I) -> Result<O, ProviderFailure>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        let body = serde_json::to_vec(input).map_err(ProviderFailure::Encode)?;

        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{action}"))
            .header(CONTENT_TYPE, AMZ_JSON)
            .body(body)
            .send()
            .await
            .map_err(ProviderFailure::Transport)?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await.map_err(ProviderFailure::Transport)?;

        if !status.is_success() {
            return Err(rejection(status, &headers, &bytes));
        }

        let bytes: &[u8] = if bytes.is_empty() { b"{}" } else { &bytes };
        serde_json::from_slice(bytes)
            .map_err(|e| ProviderFailure::InvalidResponse(format!("{action}: {e}")))
    }
}

/// Error body of the JSON API.
#[derive(Debug, Default, Deserialize)]
struct ErrorDocument {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

fn rejection(status: reqwest::StatusCode, headers: &HeaderMap, body: &[u8]) -> ProviderFailure {
    let document: ErrorDocument = serde_json::from_slice(body).unwrap_or_default();

    let code = document
        .error_type
        .as_deref()
        .or_else(|| headers.get(ERROR_TYPE_HEADER).and_then(|v| v.to_str().ok()))
        .map(error_code)
        .filter(|code| !code.is_empty());

    match code {
        Some(code) => ProviderFailure::Rejected {
            code: code.to_string(),
            message: document.message.unwrap_or_default(),
        },
        None => ProviderFailure::Status(status),
    }
}

/// Strip the `namespace#` prefix and `:suffix` from an error type.
fn error_code(raw: &str) -> &str {
    let code = raw.rsplit('#').next().unwrap_or(raw);
    code.split(':').next().unwrap_or(code).trim()
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Attribute {
    name: String,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpInput<'a> {
    client_id: &'a str,
    username: &'a str,
    password: &'a str,
    user_attributes: Vec<Attribute>,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_hash: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ConfirmSignUpInput<'a> {
    client_id: &'a str,
    username: &'a str,
    confirmation_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_hash: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthInput<'a> {
    auth_flow: &'static str,
    client_id: &'a str,
    auth_parameters: HashMap<&'static str, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthOutput {
    #[serde(default)]
    authentication_result: Option<AuthenticationResult>,
    #[serde(default)]
    challenge_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetUserInput<'a> {
    access_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetUserOutput {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    user_attributes: Vec<Attribute>,
}

/// Responses whose content is not needed.
#[derive(Deserialize)]
struct Ignored {}

// =============================================================================
// Classification
// =============================================================================

fn classify_sign_up(failure: &ProviderFailure) -> AuthError {
    match failure.code() {
        Some("UsernameExistsException") => AuthError::account_exists(),
        Some("InvalidPasswordException" | "InvalidParameterException") => {
            AuthError::invalid_input(failure.upstream_message().unwrap_or_default())
        }
        _ => unexpected("sign_up", failure, "Unable to process registration"),
    }
}

fn classify_confirm(failure: &ProviderFailure) -> AuthError {
    match failure.code() {
        Some("CodeMismatchException") => AuthError::invalid_code(),
        Some("ExpiredCodeException") => AuthError::expired_code(),
        Some("UserNotFoundException") => AuthError::invalid_input("User not found"),
        _ => unexpected("confirm_account", failure, "Unable to confirm account"),
    }
}

fn classify_login(failure: &ProviderFailure) -> AuthError {
    match failure.code() {
        Some("PasswordResetRequiredException") => AuthError::password_reset_required(),
        Some("NotAuthorizedException" | "UserNotFoundException") => {
            AuthError::invalid_credentials()
        }
        Some("UserNotConfirmedException") => AuthError::invalid_input("Account not confirmed"),
        _ => unexpected("login", failure, "Authentication service unavailable"),
    }
}

fn classify_get_user(failure: &ProviderFailure) -> AuthError {
    match failure.code() {
        Some("ForbiddenException" | "InvalidParameterException" | "NotAuthorizedException") => {
            AuthError::invalid_input(failure.upstream_message().unwrap_or_default())
        }
        _ => unexpected("get_user", failure, "Unable to fetch user info"),
    }
}

fn unexpected(operation: &'static str, failure: &ProviderFailure, detail: &str) -> AuthError {
    tracing::error!(
        operation,
        code = failure.code().unwrap_or("none"),
        error = %failure,
        "Identity provider call failed"
    );
    AuthError::service_unavailable(detail)
}

#[async_trait]
impl IdentityProvider for CognitoClient {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<(), AuthError> {
        let input = SignUpInput {
            client_id: &self.client_id,
            username: &request.email,
            password: &request.password,
            user_attributes: vec![
                Attribute {
                    name: "name".into(),
                    value: Some(request.name.clone()),
                },
                Attribute {
                    name: "email".into(),
                    value: Some(request.email.clone()),
                },
            ],
            secret_hash: self.secret_hash(&request.email),
        };

        self.call::<_, Ignored>("SignUp", &input)
            .await
            .map_err(|e| classify_sign_up(&e))?;

        tracing::info!("Account registered");
        Ok(())
    }

    async fn confirm_account(&self, request: &ConfirmRequest) -> Result<(), AuthError> {
        let input = ConfirmSignUpInput {
            client_id: &self.client_id,
            username: &request.email,
            confirmation_code: &request.code,
            secret_hash: self.secret_hash(&request.email),
        };

        self.call::<_, Ignored>("ConfirmSignUp", &input)
            .await
            .map_err(|e| classify_confirm(&e))?;

        tracing::info!("Account confirmed");
        Ok(())
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        let mut auth_parameters = HashMap::from([
            ("USERNAME", request.email.clone()),
            ("PASSWORD", request.password.clone()),
        ]);
        if let Some(hash) = self.secret_hash(&request.email) {
            auth_parameters.insert("SECRET_HASH", hash);
        }

        let input = InitiateAuthInput {
            auth_flow: USER_PASSWORD_AUTH,
            client_id: &self.client_id,
            auth_parameters,
        };

        let output: InitiateAuthOutput = self
            .call("InitiateAuth", &input)
            .await
            .map_err(|e| classify_login(&e))?;

        let Some(AuthenticationResult {
            access_token: Some(access_token),
            refresh_token,
            expires_in,
        }) = output.authentication_result
        else {
            tracing::warn!(
                challenge = output.challenge_name.as_deref().unwrap_or("none"),
                "Login returned no authentication result"
            );
            return Err(AuthError::service_unavailable("Invalid authentication result"));
        };

        Ok(LoginResponse {
            access_token,
            refresh_token: refresh_token.unwrap_or_default(),
            expires_in,
        })
    }

    async fn get_user(&self, access_token: &str) -> Result<UserInfo, AuthError> {
        let output: GetUserOutput = self
            .call("GetUser", &GetUserInput { access_token })
            .await
            .map_err(|e| classify_get_user(&e))?;

        let username = output
            .username
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AuthError::service_unavailable("Invalid user info result"))?;

        let attributes: BTreeMap<String, String> = output
            .user_attributes
            .into_iter()
            .map(|attr| (attr.name, attr.value.unwrap_or_default()))
            .collect();

        Ok(UserInfo {
            username,
            attributes,
        })
    }
}
