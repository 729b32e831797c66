use std::env;
use std::str::FromStr;

use crate::pagination::PaginationConfig;

/// Signing secret and token lifetimes.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl_secs: 300,
            refresh_ttl_secs: 86_400,
        }
    }
}

/// Everything the server reads from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub static_dir: String,
    pub jwt: JwtConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

impl AppConfig {
    /// Build the config from process env vars (call `dotenv()` first).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from an arbitrary lookup, so tests don't touch the real env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let defaults = PaginationConfig::default();
        let jwt_defaults = JwtConfig::new("");

        let pagination = PaginationConfig::new(
            parse_or(&lookup, "PAGINATION_DEFAULT_SIZE", defaults.default_size)?,
            parse_or(&lookup, "PAGINATION_MAX_SIZE", defaults.max_size)?,
        )
        .map_err(|e| ConfigError::Invalid {
            name: "PAGINATION_DEFAULT_SIZE",
            value: e.to_string(),
        })?;

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port: parse_or(&lookup, "PORT", 8080)?,
            static_dir: lookup("STATIC_DIR").unwrap_or_else(|| "./static".to_string()),
            jwt: JwtConfig {
                secret: required("JWT_SECRET")?,
                access_ttl_secs: parse_or(
                    &lookup,
                    "ACCESS_TOKEN_TTL_SECS",
                    jwt_defaults.access_ttl_secs,
                )?,
                refresh_ttl_secs: parse_or(
                    &lookup,
                    "REFRESH_TOKEN_TTL_SECS",
                    jwt_defaults.refresh_ttl_secs,
                )?,
            },
            pagination,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
