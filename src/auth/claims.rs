// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Validated token claims and the per-request identity built from them.

use serde_json::{Map, Value};

/// Claims of a token that passed every validation step.
///
/// Always carries a string issuer and subject. Built once per successful
/// validation and owned by the request's [`IdentityContext`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedClaims {
    issuer: String,
    subject: String,
    claims: Map<String, Value>,
}

impl ValidatedClaims {
    /// Wrap a decoded claim set. Returns `None` unless `iss` and `sub` are
    /// non-empty strings.
    pub fn from_map(claims: Map<String, Value>) -> Option<Self> {
        let issuer = non_empty_str(&claims, "iss")?;
        let subject = non_empty_str(&claims, "sub")?;
        Some(Self {
            issuer,
            subject,
            claims,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Expiration as a Unix timestamp.
    pub fn expires_at(&self) -> Option<i64> {
        self.claims.get("exp").and_then(Value::as_i64)
    }

    /// Any claim by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// A string claim by name.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.claims
    }
}

fn non_empty_str(claims: &Map<String, Value>, name: &str) -> Option<String> {
    claims
        .get(name)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// The authenticated principal of a request.
///
/// Inserted into request extensions by the auth middleware and read by
/// handlers through the `Identity` extractor. Holds the raw bearer token so
/// handlers can call the identity provider on the user's behalf.
#[derive(Clone)]
pub struct IdentityContext {
    claims: ValidatedClaims,
    token: String,
}

impl IdentityContext {
    pub fn new(claims: ValidatedClaims, token: impl Into<String>) -> Self {
        Self {
            claims,
            token: token.into(),
        }
    }

    pub fn subject(&self) -> &str {
        self.claims.subject()
    }

    pub fn claims(&self) -> &ValidatedClaims {
        &self.claims
    }

    /// Raw bearer token as presented by the caller.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for IdentityContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityContext")
            .field("subject", &self.subject())
            .field("token", &"[REDACTED]")
            .finish()
    }
}
