// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer-token validation against the provider's key set.
//!
//! ## Checks, in order
//!
//! 1. Size and compact structure (`header.payload.signature`)
//! 2. Algorithm: RSA family only (`RS*`, `PS*`). HMAC and `none` never pass
//! 3. `kid` present in the header
//! 4. `kid` present in the [`KeySet`], and the token algorithm matches the
//!    algorithm the JWK pins (if any)
//! 5. Signature
//! 6. Claims: `exp` not in the past (60 s clock skew), `nbf` reached, `iss`
//!    exactly equal to the configured issuer, `sub` present
//!
//! Every failure is reported to the caller as `InvalidToken`. The specific
//! reason is only logged, at debug level, and never includes the token.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde_json::{Map, Value};

use super::claims::ValidatedClaims;
use super::jwks::KeySet;
use crate::error::AuthError;

/// Upper bound on accepted token size, checked before any parsing.
pub const MAX_TOKEN_BYTES: usize = 8 * 1024;

/// Why a token was rejected. Internal detail; callers see `InvalidToken`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Oversized,
    Malformed,
    DisallowedAlgorithm,
    MissingKid,
    UnknownKid,
    AlgorithmMismatch,
    BadSignature,
    Expired,
    NotYetValid,
    IssuerMismatch,
    MissingClaim,
}

impl Rejection {
    fn as_str(self) -> &'static str {
        match self {
            Rejection::Oversized => "oversized",
            Rejection::Malformed => "malformed",
            Rejection::DisallowedAlgorithm => "disallowed_algorithm",
            Rejection::MissingKid => "missing_kid",
            Rejection::UnknownKid => "unknown_kid",
            Rejection::AlgorithmMismatch => "algorithm_mismatch",
            Rejection::BadSignature => "bad_signature",
            Rejection::Expired => "expired",
            Rejection::NotYetValid => "not_yet_valid",
            Rejection::IssuerMismatch => "issuer_mismatch",
            Rejection::MissingClaim => "missing_claim",
        }
    }
}

/// Validates bearer tokens. Holds no mutable state and is shared by every
/// request through `Arc`.
pub struct TokenValidator {
    keys: Arc<KeySet>,
    issuer: String,
}

impl TokenValidator {
    pub fn new(keys: Arc<KeySet>, issuer: impl Into<String>) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Number of signing keys available for verification.
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Validate `token` and return its claims.
    pub fn validate(&self, token: &str) -> Result<ValidatedClaims, AuthError> {
        self.verify(token).map_err(|reason| {
            tracing::debug!(reason = reason.as_str(), "Bearer token rejected");
            AuthError::invalid_token()
        })
    }

    fn verify(&self, token: &str) -> Result<ValidatedClaims, Rejection> {
        if token.len() > MAX_TOKEN_BYTES {
            return Err(Rejection::Oversized);
        }
        if token.split('.').count() != 3 {
            return Err(Rejection::Malformed);
        }

        let header = decode_header(token).map_err(|_| Rejection::Malformed)?;

        if !is_asymmetric(header.alg) {
            return Err(Rejection::DisallowedAlgorithm);
        }

        let kid = header
            .kid
            .as_deref()
            .filter(|kid| !kid.is_empty())
            .ok_or(Rejection::MissingKid)?;

        let key = self.keys.lookup(kid).ok_or(Rejection::UnknownKid)?;
        if key.algorithm().is_some_and(|pinned| pinned != header.alg) {
            return Err(Rejection::AlgorithmMismatch);
        }

        let mut validation = Validation::new(header.alg);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.set_issuer(&[&self.issuer]);
        validation.validate_nbf = true;
        // Provider access tokens carry `client_id`, not `aud`.
        validation.validate_aud = false;

        let data = decode::<Map<String, Value>>(token, key.decoding_key(), &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => Rejection::BadSignature,
                ErrorKind::ExpiredSignature => Rejection::Expired,
                ErrorKind::ImmatureSignature => Rejection::NotYetValid,
                ErrorKind::InvalidIssuer => Rejection::IssuerMismatch,
                ErrorKind::MissingRequiredClaim(_) => Rejection::MissingClaim,
                ErrorKind::InvalidAlgorithm => Rejection::AlgorithmMismatch,
                _ => Rejection::Malformed,
            })?;

        ValidatedClaims::from_map(data.claims).ok_or(Rejection::MissingClaim)
    }
}

fn is_asymmetric(alg: Algorithm) -> bool {
    matches!(
        alg,
        Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512
    )
}
