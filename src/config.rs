// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup and is
//! immutable afterwards. The signing secret in particular is never rotated
//! while the process runs.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HMAC signing secret (at least 32 bytes) | Required |
//! | `JWT_ALGORITHM` | `HS256`, `HS384` or `HS512` | `HS256` |
//! | `TOKEN_TTL_SECS` | Token lifetime in seconds | `86400` |
//! | `BCRYPT_COST` | bcrypt work factor | `12` |
//! | `SEED_ADMIN_EMAIL` | Admin account created at startup | Optional |
//! | `SEED_ADMIN_PASSWORD` | Password for the seeded admin | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::collections::HashMap;
use std::time::Duration;

use jsonwebtoken::Algorithm;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_ALGORITHM_ENV: &str = "JWT_ALGORITHM";
pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_SECS";
pub const BCRYPT_COST_ENV: &str = "BCRYPT_COST";
pub const SEED_ADMIN_EMAIL_ENV: &str = "SEED_ADMIN_EMAIL";
pub const SEED_ADMIN_PASSWORD_ENV: &str = "SEED_ADMIN_PASSWORD";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default token lifetime (24 hours).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Shortest accepted HMAC secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Configuration errors. Any of these aborts startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Token signing algorithm.
///
/// Only the HMAC family is supported: the service is both issuer and
/// verifier, so a shared secret is sufficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningAlgorithm {
    #[default]
    Hs256,
    Hs384,
    Hs512,
}

impl SigningAlgorithm {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "HS256" => Some(Self::Hs256),
            "HS384" => Some(Self::Hs384),
            "HS512" => Some(Self::Hs512),
            _ => None,
        }
    }

    pub fn as_jwt(self) -> Algorithm {
        match self {
            Self::Hs256 => Algorithm::HS256,
            Self::Hs384 => Algorithm::HS384,
            Self::Hs512 => Algorithm::HS512,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Token signing configuration.
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: Vec<u8>,
    pub algorithm: SigningAlgorithm,
    pub ttl: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Admin account to create when the store has none with that email.
#[derive(Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub token: TokenConfig,
    pub bcrypt_cost: u32,
    pub seed_admin: Option<SeedAdmin>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from a fixed set of variables.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| vars.get(name).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV,
                reason: format!("'{raw}' is not a port number"),
            })?,
            None => DEFAULT_PORT,
        };

        let secret = lookup(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: JWT_SECRET_ENV,
                reason: format!("must be at least {MIN_SECRET_LEN} bytes"),
            });
        }

        let algorithm = match lookup(JWT_ALGORITHM_ENV) {
            Some(raw) => SigningAlgorithm::parse(&raw).ok_or_else(|| ConfigError::Invalid {
                name: JWT_ALGORITHM_ENV,
                reason: format!("'{raw}' is not one of HS256, HS384, HS512"),
            })?,
            None => SigningAlgorithm::default(),
        };

        let ttl = match lookup(TOKEN_TTL_ENV) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: TOKEN_TTL_ENV,
                        reason: format!("'{raw}' is not a positive number of seconds"),
                    })
                }
            },
            None => DEFAULT_TOKEN_TTL,
        };

        let bcrypt_cost = match lookup(BCRYPT_COST_ENV) {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(cost) if (4..=31).contains(&cost) => cost,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: BCRYPT_COST_ENV,
                        reason: format!("'{raw}' is not between 4 and 31"),
                    })
                }
            },
            None => bcrypt::DEFAULT_COST,
        };

        let seed_admin = match (lookup(SEED_ADMIN_EMAIL_ENV), lookup(SEED_ADMIN_PASSWORD_ENV)) {
            (Some(email), Some(password)) => Some(SeedAdmin { email, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(SEED_ADMIN_PASSWORD_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(SEED_ADMIN_EMAIL_ENV)),
        };

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            host,
            port,
            token: TokenConfig {
                secret: secret.into_bytes(),
                algorithm,
                ttl,
            },
            bcrypt_cost,
            seed_admin,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = AppConfig::from_map(&vars(&[(JWT_SECRET_ENV, SECRET)])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.token.algorithm, SigningAlgorithm::Hs256);
        assert_eq!(config.token.ttl, DEFAULT_TOKEN_TTL);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert!(config.seed_admin.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn secret_is_required() {
        let err = AppConfig::from_map(&HashMap::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(JWT_SECRET_ENV)));
    }

    #[test]
    fn short_secret_is_rejected() {
        let err = AppConfig::from_map(&vars(&[(JWT_SECRET_ENV, "short")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: JWT_SECRET_ENV, .. }));
    }

    #[test]
    fn asymmetric_algorithm_is_rejected() {
        let err = AppConfig::from_map(&vars(&[
            (JWT_SECRET_ENV, SECRET),
            (JWT_ALGORITHM_ENV, "RS256"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: JWT_ALGORITHM_ENV, .. }));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let err = AppConfig::from_map(&vars(&[
            (JWT_SECRET_ENV, SECRET),
            (TOKEN_TTL_ENV, "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: TOKEN_TTL_ENV, .. }));
    }

    #[test]
    fn seed_admin_needs_both_halves() {
        let err = AppConfig::from_map(&vars(&[
            (JWT_SECRET_ENV, SECRET),
            (SEED_ADMIN_EMAIL_ENV, "admin@hotmail.com"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(SEED_ADMIN_PASSWORD_ENV)));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = AppConfig::from_map(&vars(&[
            (JWT_SECRET_ENV, SECRET),
            (SEED_ADMIN_EMAIL_ENV, "admin@hotmail.com"),
            (SEED_ADMIN_PASSWORD_ENV, "hunter2hunter2"),
        ]))
        .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains(SECRET));
        assert!(!rendered.contains("hunter2hunter2"));
    }
}
