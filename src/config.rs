use std::time::Duration;

use anyhow::{bail, Context};
use regex::RegexSet;

/// Paths the request gate never inspects unless `GATE_EXCLUDE` says otherwise.
pub const DEFAULT_GATE_EXCLUDE: &[&str] = &[
    r"^/api(/|$)",
    r"^/auth/",
    r"^/static/",
    r"^/assets/",
    r"^/favicon\.ico$",
    r"^/health$",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub environment: Environment,
    pub db_max_connections: u32,
    pub store_timeout: Duration,
    pub gate_exclude: RegexSet,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let environment = std::env::var("APP_ENV")
            .map(|v| Environment::parse(&v))
            .unwrap_or(Environment::Development);

        let db_max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let store_timeout = std::env::var("STORE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(5));

        let gate_exclude = match std::env::var("GATE_EXCLUDE") {
            Ok(raw) => parse_exclusions(&raw)?,
            Err(_) => default_exclusions(),
        };

        Ok(Self {
            database_url,
            jwt: JwtConfig { secret },
            environment,
            db_max_connections,
            store_timeout,
            gate_exclude,
        })
    }
}

pub fn default_exclusions() -> RegexSet {
    RegexSet::new(DEFAULT_GATE_EXCLUDE).expect("default exclusion patterns are valid")
}

/// Comma-separated regexes; blank entries are ignored.
pub fn parse_exclusions(raw: &str) -> anyhow::Result<RegexSet> {
    let patterns: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    RegexSet::new(&patterns).with_context(|| format!("invalid GATE_EXCLUDE pattern in {raw:?}"))
}
