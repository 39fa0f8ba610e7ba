//! Verification code model - short-lived, single-use login codes.

use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// State of a code, computed at read time from `consumed` and `expires_at`.
/// `Consumed` and `Expired` are terminal; there is no transition back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeState {
    Pending,
    Consumed,
    Expired,
}

/// Verification code entity. Created on successful password check and
/// mutated exactly once, from unconsumed to consumed, on successful
/// verification. Rows are never deleted here; retention is an external
/// concern.
#[derive(Debug, Clone, FromRow)]
pub struct VerificationCode {
    pub code_id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
    pub created_at: DateTime<Utc>,
}

impl VerificationCode {
    pub fn new(user_id: Uuid, code: String, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            code_id: Uuid::new_v4(),
            user_id,
            code,
            expires_at: now + ttl,
            consumed: false,
            created_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn state(&self) -> CodeState {
        if self.consumed {
            CodeState::Consumed
        } else if self.is_expired() {
            CodeState::Expired
        } else {
            CodeState::Pending
        }
    }
}
