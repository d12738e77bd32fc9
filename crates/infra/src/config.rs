//! Configuration loading and representation.
//!
//! Everything is read from environment variables once at startup. Any problem
//! here is fatal: the process must not serve requests with a missing signing
//! secret or a token lifetime the revocation ledger cannot cover.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use ridegate_auth::{DEFAULT_COST, TokenSecret, TokenSecretError};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_RETENTION_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_SWEEP_SECS: u64 = 60;
pub const DEFAULT_HASH_WORKERS: usize = 4;
/// Upper bound for TOKEN_TTL_SECS and REVOCATION_RETENTION_SECS (one year).
pub const MAX_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnv {
    #[default]
    Development,
    Production,
    Test,
}

impl AppEnv {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppEnv::Development => "development",
            AppEnv::Production => "production",
            AppEnv::Test => "test",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, AppEnv::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, AppEnv::Development)
    }
}

impl FromStr for AppEnv {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "development" => Ok(AppEnv::Development),
            "production" => Ok(AppEnv::Production),
            "test" => Ok(AppEnv::Test),
            other => Err(ConfigError::Invalid {
                var: "APP_ENV",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET: {0}")]
    Secret(#[from] TokenSecretError),

    #[error("{var} has invalid value '{value}'")]
    Invalid { var: &'static str, value: String },

    #[error("{var} must be greater than zero")]
    Zero { var: &'static str },

    #[error("{var} must not exceed {max} seconds")]
    TooLarge { var: &'static str, max: u64 },

    #[error(
        "TOKEN_TTL_SECS ({ttl_secs}) exceeds REVOCATION_RETENTION_SECS ({retention_secs}); \
         revoked tokens would outlive their ledger entries"
    )]
    TtlExceedsRetention { ttl_secs: u64, retention_secs: u64 },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: AppEnv,
    pub port: u16,
    pub secret: TokenSecret,
    pub token_ttl: Duration,
    pub revocation_retention: Duration,
    pub sweep_interval: Duration,
    pub hash_workers: usize,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset and blank values take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secret = TokenSecret::new(lookup("JWT_SECRET").ok_or(TokenSecretError::Missing)?)?;
        let env = get("APP_ENV").map(|v| v.parse::<AppEnv>()).transpose()?.unwrap_or_default();

        let port = parse_or(get("PORT"), "PORT", DEFAULT_PORT)?;
        let ttl_secs = lifetime(
            nonzero(
                parse_or(get("TOKEN_TTL_SECS"), "TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?,
                "TOKEN_TTL_SECS",
            )?,
            "TOKEN_TTL_SECS",
        )?;
        let retention_secs = lifetime(
            nonzero(
                parse_or(get("REVOCATION_RETENTION_SECS"), "REVOCATION_RETENTION_SECS", DEFAULT_RETENTION_SECS)?,
                "REVOCATION_RETENTION_SECS",
            )?,
            "REVOCATION_RETENTION_SECS",
        )?;
        let sweep_secs = nonzero(
            parse_or(get("REVOCATION_SWEEP_SECS"), "REVOCATION_SWEEP_SECS", DEFAULT_SWEEP_SECS)?,
            "REVOCATION_SWEEP_SECS",
        )?;
        let hash_workers = nonzero(
            parse_or(get("HASH_WORKERS"), "HASH_WORKERS", DEFAULT_HASH_WORKERS)?,
            "HASH_WORKERS",
        )?;

        let bcrypt_cost = parse_or(get("BCRYPT_COST"), "BCRYPT_COST", DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                var: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        if ttl_secs > retention_secs {
            return Err(ConfigError::TtlExceedsRetention {
                ttl_secs,
                retention_secs,
            });
        }

        Ok(Self {
            env,
            port,
            secret,
            token_ttl: Duration::from_secs(ttl_secs),
            revocation_retention: Duration::from_secs(retention_secs),
            sweep_interval: Duration::from_secs(sweep_secs),
            hash_workers,
            bcrypt_cost,
        })
    }

    /// Defaults with the given secret, for tests and embedding.
    pub fn with_secret(secret: TokenSecret) -> Self {
        Self {
            env: AppEnv::default(),
            port: DEFAULT_PORT,
            secret,
            token_ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
            revocation_retention: Duration::from_secs(DEFAULT_RETENTION_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_SECS),
            hash_workers: DEFAULT_HASH_WORKERS,
            bcrypt_cost: DEFAULT_COST,
        }
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { var, value }),
    }
}

fn nonzero<T: Default + PartialEq>(value: T, var: &'static str) -> Result<T, ConfigError> {
    if value == T::default() {
        Err(ConfigError::Zero { var })
    } else {
        Ok(value)
    }
}

fn lifetime(secs: u64, var: &'static str) -> Result<u64, ConfigError> {
    if secs > MAX_LIFETIME_SECS {
        Err(ConfigError::TooLarge {
            var,
            max: MAX_LIFETIME_SECS,
        })
    } else {
        Ok(secs)
    }
}
