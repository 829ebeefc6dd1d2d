// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared application state.
//!
//! Built once before the listener is bound. Everything inside is immutable
//! and shared across requests through `Arc`.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::auth::{JwksError, KeySet, TokenValidator};
use crate::config::Config;
use crate::provider::{CognitoClient, IdentityProvider};

/// Failure to build the application state. Fatal at startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("failed to load signing keys: {0}")]
    Jwks(#[from] JwksError),
}

#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<TokenValidator>,
    pub provider: Arc<dyn IdentityProvider>,
    /// Deadline applied to every provider call made by a handler.
    pub provider_timeout: Duration,
}

impl AppState {
    pub fn new(
        validator: Arc<TokenValidator>,
        provider: Arc<dyn IdentityProvider>,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            validator,
            provider,
            provider_timeout,
        }
    }

    /// Fetch the provider's signing keys and wire up the provider client.
    pub async fn initialize(config: &Config) -> Result<Self, StartupError> {
        let http = reqwest::Client::builder()
            .timeout(config.provider_timeout)
            .build()
            .map_err(StartupError::HttpClient)?;

        let keys = KeySet::fetch(&http, &config.jwks_url).await?;
        let validator = TokenValidator::new(Arc::new(keys), config.issuer_url.clone());

        let provider = CognitoClient::new(
            http,
            config.provider_endpoint.clone(),
            config.client_id.clone(),
            config.client_secret.as_deref(),
        );

        tracing::info!(
            issuer = %config.issuer_url,
            endpoint = %provider.endpoint(),
            key_count = validator.key_count(),
            "Application state initialized"
        );

        Ok(Self::new(
            Arc::new(validator),
            Arc::new(provider),
            config.provider_timeout,
        ))
    }
}
