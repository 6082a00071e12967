// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the [`Settings`] loaded from them
//! once at startup. Nothing here changes after the server starts.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH0_DOMAIN` | Identity-provider domain (issuer host) | Required |
//! | `API_AUDIENCE` | Expected JWT audience claim | Required |
//! | `AUTH_ALGORITHM` | Allowed signing algorithm (RSA only) | `RS256` |
//! | `JWKS_URL` | Override for the key-set endpoint | `https://<domain>/.well-known/jwks.json` |
//! | `JWKS_CACHE_TTL_SECS` | Key-set cache TTL, `0` disables caching | `300` |
//! | `AUTH_LEEWAY_SECS` | Clock skew tolerated on `exp`/`nbf` | `0` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use thiserror::Error;
use url::Url;

use crate::auth::{AuthConfig, JwksManager, Verifier};

pub const AUTH0_DOMAIN_ENV: &str = "AUTH0_DOMAIN";
pub const API_AUDIENCE_ENV: &str = "API_AUDIENCE";
pub const AUTH_ALGORITHM_ENV: &str = "AUTH_ALGORITHM";
pub const JWKS_URL_ENV: &str = "JWKS_URL";
pub const JWKS_CACHE_TTL_ENV: &str = "JWKS_CACHE_TTL_SECS";
pub const AUTH_LEEWAY_ENV: &str = "AUTH_LEEWAY_SECS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";
const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 300;

/// Path of the key-set document relative to the issuer.
const JWKS_PATH: &str = ".well-known/jwks.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid {
        name: &'static str,
        reason: String,
    },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

fn invalid(name: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Token-verification settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSettings {
    /// Expected `iss`, always `https://<domain>/`.
    pub issuer: String,
    pub audience: String,
    pub algorithm: Algorithm,
    pub jwks_url: Url,
    pub cache_ttl: Duration,
    /// Clock skew tolerance in seconds, off unless configured.
    pub leeway: u64,
}

impl AuthSettings {
    /// Derive issuer and key-set URL from the identity-provider domain.
    pub fn new(domain: &str, audience: impl Into<String>) -> Result<Self, ConfigError> {
        let domain = domain.trim().trim_end_matches('/');
        if domain.is_empty() || domain.contains("://") {
            return Err(invalid(AUTH0_DOMAIN_ENV, "expected a bare host name"));
        }

        let issuer = Url::parse(&format!("https://{domain}/"))
            .map_err(|e| invalid(AUTH0_DOMAIN_ENV, e))?;
        let jwks_url = issuer
            .join(JWKS_PATH)
            .map_err(|e| invalid(AUTH0_DOMAIN_ENV, e))?;

        Ok(Self {
            issuer: issuer.to_string(),
            audience: audience.into(),
            algorithm: Algorithm::RS256,
            jwks_url,
            cache_ttl: Duration::from_secs(DEFAULT_JWKS_CACHE_TTL_SECS),
            leeway: 0,
        })
    }

    /// Build the runtime auth configuration.
    pub fn build(&self) -> Result<AuthConfig, ConfigError> {
        let jwks = JwksManager::new(self.jwks_url.as_str())?.with_cache_ttl(self.cache_ttl);
        let verifier = Verifier::new(&self.issuer, &self.audience)
            .with_algorithm(self.algorithm)
            .with_leeway(self.leeway);
        Ok(AuthConfig::new(jwks, verifier))
    }
}

/// Only RSA signatures can be checked against the published key set.
fn parse_algorithm(value: &str) -> Result<Algorithm, ConfigError> {
    let algorithm =
        Algorithm::from_str(value.trim()).map_err(|e| invalid(AUTH_ALGORITHM_ENV, e))?;
    match algorithm {
        Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512 => Ok(algorithm),
        other => Err(invalid(
            AUTH_ALGORITHM_ENV,
            format!("{other:?} is not an RSA signing algorithm"),
        )),
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub auth: AuthSettings,
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through `lookup`, which returns a variable's value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let domain = required(AUTH0_DOMAIN_ENV)?;
        let mut auth = AuthSettings::new(&domain, required(API_AUDIENCE_ENV)?)?;

        if let Some(value) = lookup(AUTH_ALGORITHM_ENV) {
            auth.algorithm = parse_algorithm(&value)?;
        }
        if let Some(value) = lookup(JWKS_URL_ENV) {
            auth.jwks_url = Url::parse(&value).map_err(|e| invalid(JWKS_URL_ENV, e))?;
        }
        if let Some(value) = lookup(JWKS_CACHE_TTL_ENV) {
            let secs: u64 = value.trim().parse().map_err(|e| invalid(JWKS_CACHE_TTL_ENV, e))?;
            auth.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(value) = lookup(AUTH_LEEWAY_ENV) {
            auth.leeway = value.trim().parse().map_err(|e| invalid(AUTH_LEEWAY_ENV, e))?;
        }

        let host: IpAddr = lookup(HOST_ENV)
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .parse()
            .map_err(|e| invalid(HOST_ENV, e))?;
        let port: u16 = match lookup(PORT_ENV) {
            Some(value) => value.trim().parse().map_err(|e| invalid(PORT_ENV, e))?,
            None => DEFAULT_PORT,
        };

        let log_format = lookup(LOG_FORMAT_ENV)
            .map(|value| LogFormat::parse(&value))
            .unwrap_or_default();

        Ok(Self {
            auth,
            bind_addr: SocketAddr::new(host, port),
            log_format,
        })
    }
}
