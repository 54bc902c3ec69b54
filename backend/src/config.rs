use axum::http::HeaderValue;
use shared::Role;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid value for environment variable {var}: {reason}")]
    InvalidEnvValue { var: &'static str, reason: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub dev_mode: bool,
    pub dev_user_id: Option<i32>,
    pub dev_user_role: Role,
    pub pool_size: usize,
    pub cors_allowed_origin: Option<HeaderValue>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let dev_mode = lookup("DEV_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ if dev_mode => "dev-secret-do-not-use-in-production".to_string(),
            _ => return Err(ConfigError::MissingEnvVar("JWT_SECRET")),
        };

        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::MissingEnvVar("DATABASE_URL"))?;

        let port = match lookup("PORT") {
            Some(p) => p.parse().map_err(|_| ConfigError::InvalidEnvValue {
                var: "PORT",
                reason: format!("'{}' is not a port number", p),
            })?,
            None => 8080,
        };

        let pool_size = match lookup("DB_POOL_SIZE") {
            Some(s) => match s.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidEnvValue {
                        var: "DB_POOL_SIZE",
                        reason: format!("'{}' is not a positive integer", s),
                    })
                }
            },
            None => 10,
        };

        let dev_user_role = match lookup("DEV_USER_ROLE") {
            Some(r) => Role::from_key(&r).ok_or_else(|| ConfigError::InvalidEnvValue {
                var: "DEV_USER_ROLE",
                reason: format!("unknown role '{}'", r),
            })?,
            None => Role::Admin,
        };

        let cors_allowed_origin = match lookup("CORS_ALLOWED_ORIGIN") {
            Some(origin) if origin != "*" => Some(HeaderValue::from_str(&origin).map_err(|_| {
                ConfigError::InvalidEnvValue {
                    var: "CORS_ALLOWED_ORIGIN",
                    reason: format!("'{}' is not a valid header value", origin),
                }
            })?),
            _ => None,
        };

        Ok(Self {
            database_url,
            port,
            jwt_secret,
            dev_mode,
            dev_user_id: lookup("DEV_USER_ID").and_then(|v| v.parse().ok()),
            dev_user_role,
            pool_size,
            cors_allowed_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let cfg = config(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "s")]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.pool_size, 10);
        assert!(!cfg.dev_mode);
        assert_eq!(cfg.dev_user_role, Role::Admin);
        assert!(cfg.cors_allowed_origin.is_none());
    }

    #[test]
    fn production_requires_secret() {
        assert_eq!(
            config(&[("DATABASE_URL", "postgres://x")]).unwrap_err(),
            ConfigError::MissingEnvVar("JWT_SECRET")
        );
    }

    #[test]
    fn dev_mode_supplies_secret() {
        let cfg = config(&[("DATABASE_URL", "postgres://x"), ("DEV_MODE", "1")]).unwrap();
        assert!(cfg.dev_mode);
        assert!(!cfg.jwt_secret.is_empty());
    }

    #[test]
    fn database_url_is_required() {
        assert_eq!(
            config(&[("JWT_SECRET", "s")]).unwrap_err(),
            ConfigError::MissingEnvVar("DATABASE_URL")
        );
    }

    #[test]
    fn rejects_bad_values() {
        let base = [("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "s")];
        let with = |extra: (&'static str, &'static str)| {
            let mut pairs = base.to_vec();
            pairs.push(extra);
            config(&pairs)
        };
        assert!(matches!(
            with(("PORT", "eighty")),
            Err(ConfigError::InvalidEnvValue { var: "PORT", .. })
        ));
        assert!(matches!(
            with(("DB_POOL_SIZE", "0")),
            Err(ConfigError::InvalidEnvValue { var: "DB_POOL_SIZE", .. })
        ));
        assert!(matches!(
            with(("DEV_USER_ROLE", "root")),
            Err(ConfigError::InvalidEnvValue { var: "DEV_USER_ROLE", .. })
        ));
    }

    #[test]
    fn explicit_cors_origin() {
        let cfg = config(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("CORS_ALLOWED_ORIGIN", "https://admin.example.in"),
        ])
        .unwrap();
        assert_eq!(
            cfg.cors_allowed_origin.unwrap(),
            HeaderValue::from_static("https://admin.example.in")
        );
    }
}
