// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity Gateway - bearer-token authentication in front of a managed
//! identity provider.
//!
//! Registration, login and email confirmation are forwarded to an Amazon
//! Cognito user pool. Protected routes accept the pool's RS256 access tokens,
//! verified against the JWKS fetched once at startup.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - JWKS key set, token validation, auth middleware
//! - `error` - Closed error taxonomy and its JSON rendering
//! - `provider` - Identity-provider account operations (Cognito)
//! - `config` - Environment configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod provider;
pub mod state;

#[cfg(test)]
mod testutil;
