//! Auth orchestrator: the two-step login flow.
//!
//! `login` checks credentials and issues a short-lived single-use code;
//! `verify_code` exchanges a still-valid code for a signed session token.
//! All durable state lives behind the [`UserStore`] and [`CodeStore`]
//! collaborators; the orchestrator itself is stateless between calls.

use std::sync::Arc;

use rand::Rng;

use crate::models::VerificationCode;
use crate::services::email::EmailProvider;
use crate::services::error::AuthError;
use crate::services::jwt::JwtService;
use crate::services::store::{CodeStore, UserStore};
use crate::utils::{password_matches, Password};

const CODE_LENGTH: usize = 6;

/// Orchestrator settings, fixed at construction.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// How long an issued code remains valid.
    pub code_ttl: chrono::Duration,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    codes: Arc<dyn CodeStore>,
    email: Arc<dyn EmailProvider>,
    jwt: JwtService,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        codes: Arc<dyn CodeStore>,
        email: Arc<dyn EmailProvider>,
        jwt: JwtService,
        settings: AuthSettings,
    ) -> Self {
        Self {
            users,
            codes,
            email,
            jwt,
            settings,
        }
    }

    /// First step: check email and password, then issue a verification code
    /// and email it to the user. Returns the issued code.
    ///
    /// Unknown email and wrong password are both reported as
    /// [`AuthError::InvalidCredentials`]. Delivery failure does not undo
    /// issuance: the persisted code stays valid until it expires.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(AuthError::Store)?
            .ok_or(AuthError::InvalidCredentials)?;

        let matches = password_matches(&Password::new(password.to_string()), &user.password_hash)
            .map_err(AuthError::Store)?;
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        let code = generate_code();
        let record = VerificationCode::new(user.user_id, code.clone(), self.settings.code_ttl);

        self.codes.save(&record).await.map_err(AuthError::Store)?;

        if let Err(e) = self.email.send_verification_code(&user.email, &code).await {
            tracing::warn!(error = %e, user_id = %user.user_id, "Verification code delivery failed");
        }

        tracing::info!(user_id = %user.user_id, code_id = %record.code_id, "Verification code issued");

        Ok(code)
    }

    /// Second step: exchange a pending code for a signed session token.
    ///
    /// The unconsumed-match lookup happens before the expiry check, so an
    /// expired-but-matching code is reported as [`AuthError::CodeExpired`]
    /// rather than [`AuthError::InvalidCode`]. Consumption is a conditional
    /// update at the ledger boundary; losing that race reads as an invalid
    /// code.
    #[tracing::instrument(skip(self, code))]
    pub async fn verify_code(&self, email: &str, code: &str) -> Result<String, AuthError> {
        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(AuthError::Store)?
            .ok_or(AuthError::InvalidCredentials)?;

        let record = self
            .codes
            .find_unconsumed(code, user.user_id)
            .await
            .map_err(AuthError::Store)?
            .ok_or(AuthError::InvalidCode)?;

        if record.is_expired() {
            return Err(AuthError::CodeExpired);
        }

        if !self
            .codes
            .consume(record.code_id)
            .await
            .map_err(AuthError::Store)?
        {
            return Err(AuthError::InvalidCode);
        }

        let token = self
            .jwt
            .generate_token(&user.email, &user.role_code)
            .map_err(AuthError::Token)?;

        tracing::info!(user_id = %user.user_id, code_id = %record.code_id, "Code verified, session token issued");

        Ok(token)
    }
}

/// Fixed-width numeric code, leading zeros preserved. Drawn from the OS
/// random source: the code is a bearer secret for session establishment.
fn generate_code() -> String {
    let n = rand::rngs::OsRng.gen_range(0..1_000_000u32);
    format!("{:0width$}", n, width = CODE_LENGTH)
}
