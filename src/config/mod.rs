use serde::Deserialize;
use std::env;

use crate::services::error::AuthError;
use crate::services::AuthSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub database: DatabaseConfig,
    pub smtp: SmtpConfig,
    pub jwt: JwtConfig,
    /// How long an issued verification code remains valid, in seconds.
    pub code_expiration_seconds: i64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub user: String,
    pub app_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub token_expiry_minutes: i64,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, AuthError> {
        dotenvy::dotenv().ok();

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AuthError::Config(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = AuthConfig {
            environment,
            service_name: get_env("SERVICE_NAME", Some("transit-auth"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            database: DatabaseConfig {
                url: get_env("DATABASE_URL", None, is_prod)?,
                max_connections: get_env("DATABASE_MAX_CONNECTIONS", Some("10"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        AuthError::Config(anyhow::anyhow!(e.to_string()))
                    })?,
                min_connections: get_env("DATABASE_MIN_CONNECTIONS", Some("1"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        AuthError::Config(anyhow::anyhow!(e.to_string()))
                    })?,
            },
            smtp: SmtpConfig {
                host: get_env("SMTP_HOST", Some("smtp.gmail.com"), is_prod)?,
                user: get_env("SMTP_USER", None, is_prod)?,
                app_password: get_env("SMTP_APP_PASSWORD", None, is_prod)?,
            },
            jwt: JwtConfig {
                secret: get_env("JWT_SECRET", None, is_prod)?,
                token_expiry_minutes: get_env("JWT_TOKEN_EXPIRY_MINUTES", Some("60"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        AuthError::Config(anyhow::anyhow!(e.to_string()))
                    })?,
            },
            code_expiration_seconds: get_env("CODE_EXPIRATION_SECONDS", Some("300"), is_prod)?
                .parse()
                .map_err(|e: std::num::ParseIntError| {
                    AuthError::Config(anyhow::anyhow!(e.to_string()))
                })?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Immutable settings handed to the orchestrator at construction.
    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            code_ttl: chrono::Duration::seconds(self.code_expiration_seconds),
        }
    }

    fn validate(&self) -> Result<(), AuthError> {
        if self.code_expiration_seconds <= 0 {
            return Err(AuthError::Config(anyhow::anyhow!(
                "CODE_EXPIRATION_SECONDS must be positive"
            )));
        }

        if self.jwt.token_expiry_minutes <= 0 {
            return Err(AuthError::Config(anyhow::anyhow!(
                "JWT_TOKEN_EXPIRY_MINUTES must be positive"
            )));
        }

        if self.database.max_connections == 0 {
            return Err(AuthError::Config(anyhow::anyhow!(
                "DATABASE_MAX_CONNECTIONS must be greater than 0"
            )));
        }

        if self.environment == Environment::Prod && self.jwt.secret.len() < 32 {
            return Err(AuthError::Config(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 bytes in production"
            )));
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AuthError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AuthError::Config(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AuthError::Config(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
