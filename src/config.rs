use std::str::FromStr;

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/reverse";

/// Longest accepted token lifetime: one year.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Argon2id cost factors.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderConfig {
    pub url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub geocoder: GeocoderConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig {
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parsed(&lookup, "APP_PORT")
                .or_else(|| parsed(&lookup, "PORT"))
                .unwrap_or(8080),
        };
        let jwt = JwtConfig {
            secret: lookup("JWT_SECRET")
                .filter(|s| !s.is_empty())
                .context("JWT_SECRET must be set")?,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "latlongapi".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "latlongapi-users".into()),
            ttl_minutes: parsed(&lookup, "JWT_TTL_MINUTES").unwrap_or(60 * 24),
        };
        anyhow::ensure!(
            (1..=MAX_TTL_MINUTES).contains(&jwt.ttl_minutes),
            "JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {}",
            jwt.ttl_minutes
        );
        let password = PasswordConfig {
            memory_kib: parsed(&lookup, "ARGON2_MEMORY_KIB").unwrap_or(argon2::Params::DEFAULT_M_COST),
            iterations: parsed(&lookup, "ARGON2_ITERATIONS").unwrap_or(argon2::Params::DEFAULT_T_COST),
            parallelism: parsed(&lookup, "ARGON2_PARALLELISM").unwrap_or(argon2::Params::DEFAULT_P_COST),
        };
        let geocoder = GeocoderConfig {
            url: lookup("GEOCODER_URL").unwrap_or_else(|| DEFAULT_GEOCODER_URL.into()),
            user_agent: lookup("GEOCODER_USER_AGENT").unwrap_or_else(|| "LatLongAPI-Rust/1.0".into()),
            timeout_secs: parsed(&lookup, "GEOCODER_TIMEOUT_SECS").unwrap_or(10),
        };
        Ok(Self {
            server,
            jwt,
            password,
            geocoder,
        })
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse::<T>().ok())
}
