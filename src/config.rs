use std::{env, str::FromStr};

use derive_more::Display;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StoreKind {
    #[display("postgres")]
    Postgres,
    #[display("memory")]
    Memory,
}

impl FromStr for StoreKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            other => Err(AppError::Config(format!("STORE must be postgres or memory, got {other}"))),
        }
    }
}

/// Server settings, read from the environment (after `.env` is loaded).
///
/// | Var                  | Default     |
/// |----------------------|-------------|
/// | `STORE`              | `postgres`  |
/// | `DATABASE_URL`       | required for postgres |
/// | `HOST`               | `127.0.0.1` |
/// | `PORT`               | `8080`      |
/// | `JWT_SECRET`         | required    |
/// | `SESSION_TTL_HOURS`  | `24`        |
/// | `DB_MAX_CONNECTIONS` | `5`         |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub db_max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let store: StoreKind = lookup("STORE").as_deref().unwrap_or("postgres").parse()?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if store == StoreKind::Postgres && database_url.is_none() {
            return Err(AppError::Config("DATABASE_URL must be set".to_string()));
        }

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| AppError::Config("JWT_SECRET must be set".to_string()))?;

        Ok(AppConfig {
            store,
            database_url,
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            jwt_secret,
            session_ttl_hours: parse_or(&lookup, "SESSION_TTL_HOURS", 24)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} is not valid: {raw}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/courses"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.store, StoreKind::Postgres);
        assert_eq!(config.address(), "127.0.0.1:8080");
        assert_eq!(config.session_ttl_hours, 24);
        assert_eq!(config.db_max_connections, 5);
    }

    #[test]
    fn memory_store_needs_no_database() {
        let config = AppConfig::from_lookup(lookup(&[("STORE", "memory"), ("JWT_SECRET", "secret")])).unwrap();
        assert_eq!(config.store, StoreKind::Memory);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn missing_or_malformed_values_are_config_errors() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("JWT_SECRET", "secret")])),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("STORE", "memory"), ("JWT_SECRET", "s"), ("PORT", "eighty")])),
            Err(AppError::Config(_))
        ));
    }
}
