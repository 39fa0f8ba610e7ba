use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;

/// Session token issuer. Stateless: signing an `(email, role)` pair is a
/// pure function of the configured secret and the clock.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_minutes: i64,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// Role code
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            token_expiry_minutes: config.token_expiry_minutes,
        }
    }

    /// Sign a session token for a verified user.
    pub fn generate_token(&self, email: &str, role: &str) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.token_expiry_minutes);

        let claims = Claims {
            sub: email.to_string(),
            role: role.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode session token: {}", e))?;

        Ok(token)
    }

    /// Validate a session token and return its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, anyhow::Error> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow::anyhow!("Invalid session token: {}", e))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        JwtService::new(&JwtConfig {
            secret: "a-test-secret-at-least-32-bytes-long".to_string(),
            token_expiry_minutes: 60,
        })
    }

    #[test]
    fn token_round_trips_email_and_role() {
        let service = test_service();

        let token = service.generate_token("driver@example.com", "driver").unwrap();
        assert!(!token.is_empty());

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "driver@example.com");
        assert_eq!(claims.role, "driver");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let service = test_service();
        let other = JwtService::new(&JwtConfig {
            secret: "another-secret-also-32-bytes-long!!".to_string(),
            token_expiry_minutes: 60,
        });

        let token = other.generate_token("driver@example.com", "driver").unwrap();
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let service = test_service();
        assert!(service.validate_token("not.a.token").is_err());
    }
}
