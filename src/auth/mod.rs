// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token authentication against the identity provider's published keys.
//!
//! ## Auth Flow
//!
//! 1. The client logs in through `/auth/login` and receives an access token
//! 2. The client sends `Authorization: Bearer <token>`
//! 3. The gateway:
//!    - Looks up the signing key by `kid` in the JWKS snapshot taken at startup
//!    - Verifies algorithm, signature, expiry and issuer
//!    - Attaches an [`IdentityContext`] to the request
//!
//! ## Security
//!
//! - Only RSA signatures are accepted (no HMAC, no `none`)
//! - Unknown `kid`s fail closed; the key set is never refetched per request
//! - Clock skew tolerance is 60 seconds
//! - Tokens and claims are never logged

pub mod claims;
pub mod extractor;
pub mod jwks;
pub mod middleware;
pub mod validator;

pub use claims::{IdentityContext, ValidatedClaims};
pub use extractor::Identity;
pub use jwks::{JwksError, KeySet, VerificationKey};
pub use middleware::require_auth;
pub use validator::{TokenValidator, MAX_TOKEN_BYTES};
