// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from environment variables at startup. Invalid or
//! missing required values abort startup before the listener is bound.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ENV` | Deployment environment label | `local` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `COGNITO_ISSUER_URL` | Expected `iss` claim of access tokens | Required |
//! | `COGNITO_JWKS_URL` | JWKS endpoint for token verification | Required |
//! | `COGNITO_CLIENT_ID` | User-pool app client id | Required |
//! | `COGNITO_CLIENT_SECRET` | App client secret (enables `SecretHash`) | Optional |
//! | `COGNITO_ENDPOINT` | User-pool API endpoint | Origin of the issuer URL |
//! | `PROVIDER_TIMEOUT_SECS` | Deadline for each provider call and the JWKS fetch | `10` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `json` |
//! | `RUST_LOG` | Log level filter | `identity_gateway=info,tower_http=info` |

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const ENV_ENV: &str = "ENV";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const ISSUER_URL_ENV: &str = "COGNITO_ISSUER_URL";
pub const JWKS_URL_ENV: &str = "COGNITO_JWKS_URL";
pub const CLIENT_ID_ENV: &str = "COGNITO_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "COGNITO_CLIENT_SECRET";
pub const ENDPOINT_ENV: &str = "COGNITO_ENDPOINT";
pub const PROVIDER_TIMEOUT_ENV: &str = "PROVIDER_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_ENV: &str = "local";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;
const MAX_PROVIDER_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid URL in {var}: {reason}")]
    InvalidUrl { var: &'static str, reason: String },

    #[error("Invalid port configuration: {0}")]
    InvalidPort(String),

    #[error("Invalid provider timeout configuration: {0}")]
    InvalidTimeout(String),
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl LogFormat {
    /// Read `LOG_FORMAT` from the process environment.
    pub fn from_env() -> (Self, Option<String>) {
        Self::from_vars(&env::vars().collect())
    }

    /// Read `LOG_FORMAT`. Returns the rejected value alongside the default
    /// when it is not recognised, so the caller can warn once logging is up.
    pub fn from_vars(vars: &HashMap<String, String>) -> (Self, Option<String>) {
        match vars.get(LOG_FORMAT_ENV).map(|v| v.trim().to_ascii_lowercase()) {
            None => (Self::Json, None),
            Some(v) if v.is_empty() || v == "json" => (Self::Json, None),
            Some(v) if v == "pretty" => (Self::Pretty, None),
            Some(v) => (Self::Json, Some(v)),
        }
    }
}

/// Service configuration.
///
/// The client secret is redacted in Debug output.
#[derive(Clone)]
pub struct Config {
    /// Deployment environment label (`local`, `staging`, `production`, ...).
    pub env: String,
    pub host: String,
    pub port: u16,
    /// Expected `iss` claim, compared byte for byte.
    pub issuer_url: String,
    pub jwks_url: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    /// User-pool API endpoint for account operations.
    pub provider_endpoint: String,
    pub provider_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("env", &self.env)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("issuer_url", &self.issuer_url)
            .field("jwks_url", &self.jwks_url)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("provider_endpoint", &self.provider_endpoint)
            .field("provider_timeout", &self.provider_timeout)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let env = optional(vars, ENV_ENV).unwrap_or_else(|| DEFAULT_ENV.to_string());
        let host = optional(vars, HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match optional(vars, PORT_ENV) {
            None => DEFAULT_PORT,
            Some(value) => value.parse().map_err(|e| {
                ConfigError::InvalidPort(format!("PORT must be 1-65535, got '{value}': {e}"))
            })?,
        };
        if port == 0 {
            return Err(ConfigError::InvalidPort("PORT must be 1-65535, got '0'".into()));
        }

        let issuer_url = required(vars, ISSUER_URL_ENV)?;
        let issuer = parse_http_url(ISSUER_URL_ENV, &issuer_url)?;

        let jwks_url = required(vars, JWKS_URL_ENV)?;
        parse_http_url(JWKS_URL_ENV, &jwks_url)?;

        let client_id = required(vars, CLIENT_ID_ENV)?;
        let client_secret = optional(vars, CLIENT_SECRET_ENV);

        let provider_endpoint = match optional(vars, ENDPOINT_ENV) {
            Some(endpoint) => {
                parse_http_url(ENDPOINT_ENV, &endpoint)?;
                endpoint
            }
            None => issuer.origin().ascii_serialization(),
        };

        let provider_timeout = match optional(vars, PROVIDER_TIMEOUT_ENV) {
            None => Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
            Some(value) => {
                let secs: u64 = value.parse().map_err(|e| {
                    ConfigError::InvalidTimeout(format!(
                        "{PROVIDER_TIMEOUT_ENV} must be a whole number of seconds, got '{value}': {e}"
                    ))
                })?;
                if !(1..=MAX_PROVIDER_TIMEOUT_SECS).contains(&secs) {
                    return Err(ConfigError::InvalidTimeout(format!(
                        "{PROVIDER_TIMEOUT_ENV} must be between 1 and {MAX_PROVIDER_TIMEOUT_SECS}, got {secs}"
                    )));
                }
                Duration::from_secs(secs)
            }
        };

        Ok(Self {
            env,
            host,
            port,
            issuer_url,
            jwks_url,
            client_id,
            client_secret,
            provider_endpoint,
            provider_timeout,
        })
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A set, non-blank variable. Blank values count as unset.
fn optional(vars: &HashMap<String, String>, name: &str) -> Option<String> {
    vars.get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(vars: &HashMap<String, String>, name: &'static str) -> Result<String, ConfigError> {
    optional(vars, name).ok_or(ConfigError::MissingEnvVar(name))
}

fn parse_http_url(var: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
        var,
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl {
            var,
            reason: format!("expected an http(s) URL, got '{value}'"),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_reads_process_environment() {
        let vars: HashMap<String, String> = env::vars().collect();
        assert_eq!(
            format!("{:?}", Config::from_env()),
            format!("{:?}", Config::from_vars(&vars))
        );
        assert_eq!(LogFormat::from_env(), LogFormat::from_vars(&vars));
    }

    const ISSUER: &str = "https://cognito-idp.eu-west-1.amazonaws.com/eu-west-1_AbCdEf123";

    fn base_vars() -> HashMap<String, String> {
        HashMap::from([
            (ISSUER_URL_ENV.to_string(), ISSUER.to_string()),
            (
                JWKS_URL_ENV.to_string(),
                format!("{ISSUER}/.well-known/jwks.json"),
            ),
            (CLIENT_ID_ENV.to_string(), "4abc1234client".to_string()),
        ])
    }

    fn with(mut vars: HashMap<String, String>, name: &str, value: &str) -> HashMap<String, String> {
        vars.insert(name.to_string(), value.to_string());
        vars
    }

    #[test]
    fn defaults_applied() {
        let config = Config::from_vars(&base_vars()).unwrap();

        assert_eq!(config.env, "local");
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.issuer_url, ISSUER);
        assert_eq!(config.client_secret, None);
        assert_eq!(config.provider_timeout, Duration::from_secs(10));
    }

    #[test]
    fn endpoint_defaults_to_issuer_origin() {
        let config = Config::from_vars(&base_vars()).unwrap();
        assert_eq!(
            config.provider_endpoint,
            "https://cognito-idp.eu-west-1.amazonaws.com"
        );
    }

    #[test]
    fn explicit_endpoint_wins() {
        let vars = with(base_vars(), ENDPOINT_ENV, "http://localhost:9229");
        let config = Config::from_vars(&vars).unwrap();
        assert_eq!(config.provider_endpoint, "http://localhost:9229");
    }

    #[test]
    fn issuer_is_kept_verbatim() {
        let vars = with(base_vars(), ISSUER_URL_ENV, &format!("{ISSUER}/"));
        let config = Config::from_vars(&vars).unwrap();
        assert_eq!(config.issuer_url, format!("{ISSUER}/"));
    }

    #[test]
    fn required_variables_are_enforced() {
        for name in [ISSUER_URL_ENV, JWKS_URL_ENV, CLIENT_ID_ENV] {
            let mut vars = base_vars();
            vars.remove(name);
            assert_eq!(
                Config::from_vars(&vars).unwrap_err(),
                ConfigError::MissingEnvVar(name)
            );

            let vars = with(base_vars(), name, "   ");
            assert_eq!(
                Config::from_vars(&vars).unwrap_err(),
                ConfigError::MissingEnvVar(name)
            );
        }
    }

    #[test]
    fn urls_must_be_http() {
        let vars = with(base_vars(), JWKS_URL_ENV, "not a url");
        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidUrl { var: JWKS_URL_ENV, .. })
        ));

        let vars = with(base_vars(), ISSUER_URL_ENV, "ftp://example.com/pool");
        assert!(matches!(
            Config::from_vars(&vars),
            Err(ConfigError::InvalidUrl { var: ISSUER_URL_ENV, .. })
        ));
    }

    #[test]
    fn port_is_validated() {
        let vars = with(base_vars(), PORT_ENV, "3000");
        assert_eq!(Config::from_vars(&vars).unwrap().port, 3000);

        for bad in ["0", "70000", "http"] {
            let vars = with(base_vars(), PORT_ENV, bad);
            assert!(matches!(
                Config::from_vars(&vars),
                Err(ConfigError::InvalidPort(_))
            ));
        }
    }

    #[test]
    fn provider_timeout_range() {
        let vars = with(base_vars(), PROVIDER_TIMEOUT_ENV, "120");
        assert_eq!(
            Config::from_vars(&vars).unwrap().provider_timeout,
            Duration::from_secs(120)
        );

        for bad in ["0", "121", "-1", "ten"] {
            let vars = with(base_vars(), PROVIDER_TIMEOUT_ENV, bad);
            assert!(matches!(
                Config::from_vars(&vars),
                Err(ConfigError::InvalidTimeout(_))
            ));
        }
    }

    #[test]
    fn debug_redacts_client_secret() {
        let vars = with(base_vars(), CLIENT_SECRET_ENV, "super-secret-value");
        let config = Config::from_vars(&vars).unwrap();
        assert_eq!(config.client_secret.as_deref(), Some("super-secret-value"));

        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn log_format_parsing() {
        let parse = |value: Option<&str>| {
            let mut vars = HashMap::new();
            if let Some(value) = value {
                vars.insert(LOG_FORMAT_ENV.to_string(), value.to_string());
            }
            LogFormat::from_vars(&vars)
        };

        assert_eq!(parse(None), (LogFormat::Json, None));
        assert_eq!(parse(Some("pretty")), (LogFormat::Pretty, None));
        assert_eq!(parse(Some("JSON")), (LogFormat::Json, None));
        assert_eq!(
            parse(Some("xml")),
            (LogFormat::Json, Some("xml".to_string()))
        );
    }
}
