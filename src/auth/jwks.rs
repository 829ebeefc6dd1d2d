// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and lookup.
//!
//! ## Lifecycle
//!
//! The provider's key set is fetched exactly once, while the service starts.
//! A failed fetch aborts startup. Afterwards the [`KeySet`] is an immutable
//! snapshot shared through `Arc`, so concurrent lookups need no locking.
//!
//! A `kid` missing from the snapshot (for example after a provider key
//! rotation) is an authentication failure, never a refetch.

use std::collections::HashMap;

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey};
use reqwest::StatusCode;
use serde::Deserialize;

/// Failure to load the key set at startup.
#[derive(Debug, thiserror::Error)]
pub enum JwksError {
    #[error("failed to reach JWKS endpoint: {0}")]
    Request(#[source] reqwest::Error),
    #[error("JWKS endpoint returned HTTP {0}")]
    Status(StatusCode),
    #[error("JWKS document could not be parsed: {0}")]
    Parse(#[source] reqwest::Error),
}

/// Raw JWKS document. Entries are parsed one by one so a key type this
/// service cannot model does not reject the whole set.
#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<serde_json::Value>,
}

/// A public key usable for token verification.
pub struct VerificationKey {
    key: DecodingKey,
    /// Algorithm pinned by the JWK `alg` field, if the provider declared one.
    algorithm: Option<Algorithm>,
}

impl VerificationKey {
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.key
    }

    pub fn algorithm(&self) -> Option<Algorithm> {
        self.algorithm
    }
}

impl std::fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Immutable snapshot of the provider's signing keys, indexed by `kid`.
#[derive(Debug, Default)]
pub struct KeySet {
    keys: HashMap<String, VerificationKey>,
}

impl KeySet {
    /// Fetch and parse the JWKS document.
    pub async fn fetch(client: &reqwest::Client, jwks_url: &str) -> Result<Self, JwksError> {
        tracing::debug!(url = %jwks_url, "Fetching JWKS");

        let response = client
            .get(jwks_url)
            .send()
            .await
            .map_err(JwksError::Request)?;

        if !response.status().is_success() {
            return Err(JwksError::Status(response.status()));
        }

        let document: JwksDocument = response.json().await.map_err(JwksError::Parse)?;
        let key_set = Self::from_entries(document.keys);

        if key_set.is_empty() {
            tracing::warn!(url = %jwks_url, "JWKS contains no usable keys; every token will be rejected");
        } else {
            tracing::info!(key_count = key_set.len(), "JWKS loaded");
        }

        Ok(key_set)
    }

    /// Build a snapshot from a parsed JWKS document.
    ///
    /// Only RSA keys with a `kid` are kept. Everything else is skipped with a
    /// warning since it can never verify an accepted token.
    pub fn from_jwk_set(jwks: JwkSet) -> Self {
        Self::from_jwks(&jwks.keys)
    }

    /// Build a snapshot from raw JWKS entries, skipping entries that do not
    /// parse as a JWK (unknown `kty` or `alg`).
    fn from_entries(entries: Vec<serde_json::Value>) -> Self {
        let parsed: Vec<Jwk> = entries
            .into_iter()
            .filter_map(|entry| {
                let kid = entry
                    .get("kid")
                    .and_then(|v| v.as_str())
                    .unwrap_or("-")
                    .to_owned();
                serde_json::from_value(entry)
                    .map_err(|e| {
                        tracing::warn!(kid = %kid, error = %e, "Skipping unparseable JWK");
                    })
                    .ok()
            })
            .collect();

        Self::from_jwks(&parsed)
    }

    fn from_jwks(jwks: &[Jwk]) -> Self {
        let mut keys = HashMap::with_capacity(jwks.len());

        for jwk in jwks {
            let Some(kid) = jwk.common.key_id.clone() else {
                tracing::warn!("Skipping JWK without kid");
                continue;
            };

            match verification_key(jwk) {
                Some(key) => {
                    keys.insert(kid, key);
                }
                None => tracing::warn!(kid = %kid, "Skipping unsupported JWK"),
            }
        }

        Self { keys }
    }

    /// Find the key for `kid`. A pure map read.
    pub fn lookup(&self, kid: &str) -> Option<&VerificationKey> {
        self.keys.get(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Convert an RSA JWK to a verification key.
fn verification_key(jwk: &Jwk) -> Option<VerificationKey> {
    let AlgorithmParameters::RSA(rsa) = &jwk.algorithm else {
        return None;
    };

    let algorithm = match jwk.common.key_algorithm {
        None => None,
        Some(declared) => Some(rsa_algorithm(declared)?),
    };

    let key = DecodingKey::from_rsa_components(&rsa.n, &rsa.e).ok()?;
    Some(VerificationKey { key, algorithm })
}

fn rsa_algorithm(declared: KeyAlgorithm) -> Option<Algorithm> {
    match declared {
        KeyAlgorithm::RS256 => Some(Algorithm::RS256),
        KeyAlgorithm::RS384 => Some(Algorithm::RS384),
        KeyAlgorithm::RS512 => Some(Algorithm::RS512),
        KeyAlgorithm::PS256 => Some(Algorithm::PS256),
        KeyAlgorithm::PS384 => Some(Algorithm::PS384),
        KeyAlgorithm::PS512 => Some(Algorithm::PS512),
        _ => None,
    }
}
