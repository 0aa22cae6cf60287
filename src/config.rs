use std::env;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),
    #[error("environment variable {0} is invalid: {1}")]
    Invalid(&'static str, String),
}

/// Runtime configuration, loaded once at startup and shared read-only.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 30;

    /// Reads `.env` and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    ///
    /// There is no fallback signing secret: a missing or blank `JWT_SECRET`
    /// is a startup error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            match lookup(key) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(ConfigError::Missing(key)),
            }
        };

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::Invalid("PORT", e.to_string()))?,
            None => 8000,
        };

        let access_token_ttl_minutes = match lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(raw) => {
                let minutes = raw
                    .parse::<i64>()
                    .map_err(|e| ConfigError::Invalid("ACCESS_TOKEN_EXPIRE_MINUTES", e.to_string()))?;
                if minutes <= 0 {
                    return Err(ConfigError::Invalid(
                        "ACCESS_TOKEN_EXPIRE_MINUTES",
                        "must be positive".to_string(),
                    ));
                }
                minutes
            }
            None => Self::DEFAULT_ACCESS_TOKEN_TTL_MINUTES,
        };

        // bcrypt accepts costs 4..=31
        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(raw) => {
                let cost = raw
                    .parse::<u32>()
                    .map_err(|e| ConfigError::Invalid("BCRYPT_COST", e.to_string()))?;
                if !(4..=31).contains(&cost) {
                    return Err(ConfigError::Invalid("BCRYPT_COST", "must be between 4 and 31".to_string()));
                }
                cost
            }
            None => bcrypt::DEFAULT_COST,
        };

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["http://localhost:3000".to_string()]);

        Ok(Self {
            host,
            port,
            database_url,
            jwt_secret,
            access_token_ttl_minutes,
            bcrypt_cost,
            cors_origins,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "mongodb://localhost:27017/users_db"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.access_token_ttl_minutes, 30);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.cors_origins, vec!["http://localhost:3000".to_string()]);
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_missing_secret_fails() {
        let result = AppConfig::from_lookup(lookup_from(&[(
            "DATABASE_URL",
            "mongodb://localhost:27017/users_db",
        )]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn test_blank_secret_fails() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "mongodb://localhost:27017/users_db"),
            ("JWT_SECRET", "   "),
        ]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn test_missing_database_url_fails() {
        let result = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn test_overrides_parsed() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "mongodb://db:27017/users_db"),
            ("JWT_SECRET", "s3cret"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9090"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "5"),
            ("BCRYPT_COST", "4"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9090");
        assert_eq!(config.access_token_ttl_minutes, 5);
        assert_eq!(config.bcrypt_cost, 4);
        assert_eq!(
            config.cors_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let base = [
            ("DATABASE_URL", "mongodb://db:27017/users_db"),
            ("JWT_SECRET", "s3cret"),
        ];

        let mut vars = base.to_vec();
        vars.push(("PORT", "not-a-port"));
        assert!(matches!(
            AppConfig::from_lookup(lookup_from(&vars)),
            Err(ConfigError::Invalid("PORT", _))
        ));

        let mut vars = base.to_vec();
        vars.push(("ACCESS_TOKEN_EXPIRE_MINUTES", "0"));
        assert!(matches!(
            AppConfig::from_lookup(lookup_from(&vars)),
            Err(ConfigError::Invalid("ACCESS_TOKEN_EXPIRE_MINUTES", _))
        ));

        let mut vars = base.to_vec();
        vars.push(("BCRYPT_COST", "2"));
        assert!(matches!(
            AppConfig::from_lookup(lookup_from(&vars)),
            Err(ConfigError::Invalid("BCRYPT_COST", _))
        ));
    }
}
